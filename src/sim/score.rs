/// High score persistence.
///
/// ## File format:
///   A single key-value line, `highscore=<n>`. A file holding just a bare
///   integer is read too.
///
/// A missing or unreadable file counts as a high score of 0. Writes only go
/// through when the new score beats the stored one.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::APP_DIR;

const SCORE_FILE: &str = "highscore.dat";
const KEY: &str = "highscore";

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum ScoreError {
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::Write { path, source } => {
                write!(f, "could not write high score to {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ScoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoreError::Write { source, .. } => Some(source),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_matype");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. ~/.local/share/matype for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    /// Store backed by `highscore.dat` inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        ScoreStore { path: dir.as_ref().join(SCORE_FILE) }
    }

    /// `dir` when configured, otherwise the auto-detected save directory.
    pub fn locate(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => ScoreStore::new(d),
            None => ScoreStore::new(save_dir()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored high score, 0 when absent or corrupt.
    pub fn load_score(&self) -> u32 {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| parse_score(&text))
            .unwrap_or(0)
    }

    /// Persist `score` if it beats the stored value. Returns whether a write
    /// happened.
    pub fn write_score(&self, score: u32) -> Result<bool, ScoreError> {
        if score <= self.load_score() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ScoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, format!("{KEY}={score}\n")).map_err(|source| ScoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("new high score {score} written to {}", self.path.display());
        Ok(true)
    }
}

fn parse_score(text: &str) -> Option<u32> {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value = match line.split_once('=') {
            Some((key, val)) if key.trim() == KEY => val.trim(),
            Some(_) => continue,
            None => line,
        };
        return value.parse().ok();
    }
    None
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        assert_eq!(store.load_score(), 0);
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        assert!(store.write_score(42).unwrap());
        assert_eq!(store.load_score(), 42);
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "highscore=42\n");
    }

    #[test]
    fn lower_or_equal_score_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        store.write_score(50).unwrap();
        assert!(!store.write_score(30).unwrap());
        assert!(!store.write_score(50).unwrap());
        assert_eq!(store.load_score(), 50);
    }

    #[test]
    fn zero_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        assert!(!store.write_score(0).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn bare_integer_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        std::fs::write(store.path(), "117\n").unwrap();
        assert_eq!(store.load_score(), 117);
        std::fs::write(store.path(), "highscore=lots\n").unwrap();
        assert_eq!(store.load_score(), 0);
        std::fs::write(store.path(), "").unwrap();
        assert_eq!(store.load_score(), 0);
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::locate(Some(&dir.path().join("nested")));
        assert!(store.write_score(9).unwrap());
        assert_eq!(store.load_score(), 9);
    }

    #[test]
    fn parse_skips_other_keys() {
        assert_eq!(parse_score("# scores\nversion=2\nhighscore = 8\n"), Some(8));
        assert_eq!(parse_score("version=2\n"), None);
    }
}
