/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::rules::{DamageRule, Difficulty, MIN_SPAWN_INTERVAL};

/// Name used for data directories (`~/.local/share/matype`, `/usr/share/matype`).
pub const APP_DIR: &str = "matype";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    /// External word file; `None` uses the embedded bank.
    pub words_file: Option<PathBuf>,
    /// Directory for `highscore.dat`; `None` auto-detects.
    pub score_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub spawn_interval_secs: f32,
    pub spawn_interval_decay: f32,
    pub fall_speed: f32,                // field heights per second
    pub fall_speed_per_difficulty: f32, // added per difficulty offset point
    pub backdrop_period_secs: f32,
    pub backdrop_fade_secs: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub max_health: u32,
    pub words_per_level: u32,
    pub damage: DamageRule,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_spawn_interval")]
    spawn_interval_secs: f32,
    #[serde(default = "default_spawn_decay")]
    spawn_interval_decay: f32,
    #[serde(default = "default_fall_speed")]
    fall_speed: f32,
    #[serde(default = "default_fall_speed_step")]
    fall_speed_per_difficulty: f32,
    #[serde(default = "default_backdrop_period")]
    backdrop_period_secs: f32,
    #[serde(default = "default_backdrop_fade")]
    backdrop_fade_secs: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_max_health")]
    max_health: u32,
    #[serde(default = "default_words_per_level")]
    words_per_level: u32,
    #[serde(default)]
    damage: DamageRule,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    words_file: String,
    #[serde(default)]
    score_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 28 }           // ~35 ticks per second
fn default_spawn_interval() -> f32 { 2.5 }
fn default_spawn_decay() -> f32 { 0.99 }
fn default_fall_speed() -> f32 { 30.0 / 700.0 } // crosses the field in ~23s
fn default_fall_speed_step() -> f32 { 3.0 / 700.0 }
fn default_backdrop_period() -> f32 { 25.0 }
fn default_backdrop_fade() -> f32 { 0.7 }
fn default_max_health() -> u32 { 5 }
fn default_words_per_level() -> u32 { 10 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into(), "B".into()] }
fn default_pause() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            spawn_interval_secs: default_spawn_interval(),
            spawn_interval_decay: default_spawn_decay(),
            fall_speed: default_fall_speed(),
            fall_speed_per_difficulty: default_fall_speed_step(),
            backdrop_period_secs: default_backdrop_period(),
            backdrop_fade_secs: default_backdrop_fade(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            max_health: default_max_health(),
            words_per_level: default_words_per_level(),
            damage: DamageRule::default(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl TimingConfig {
    /// Fall speed in field heights per second for a difficulty.
    pub fn fall_speed_for(&self, difficulty: Difficulty) -> f32 {
        self.fall_speed + self.fall_speed_per_difficulty * difficulty.offset() as f32
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::resolve(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, data dirs.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Relative paths resolve against CWD.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::resolve(toml_cfg, &[]))
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let t = toml_cfg.timing;
        let r = toml_cfg.rules;
        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: t.tick_rate_ms.max(1),
                spawn_interval_secs: t.spawn_interval_secs.max(MIN_SPAWN_INTERVAL),
                spawn_interval_decay: t.spawn_interval_decay.clamp(0.01, 1.0),
                fall_speed: t.fall_speed.max(0.0),
                fall_speed_per_difficulty: t.fall_speed_per_difficulty.max(0.0),
                backdrop_period_secs: t.backdrop_period_secs.max(1.0),
                backdrop_fade_secs: t.backdrop_fade_secs.max(0.0),
            },
            rules: RulesConfig {
                max_health: r.max_health.max(1),
                words_per_level: r.words_per_level.max(1),
                damage: r.damage,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                pause: toml_cfg.gamepad.pause,
            },
            words_file: resolve_path(&toml_cfg.general.words_file, search_dirs, |p| p.is_file()),
            score_dir: resolve_path(&toml_cfg.general.score_dir, search_dirs, |p| p.is_dir()),
        }
    }
}

/// Empty → None. Absolute → as given. Relative → first candidate dir where
/// it exists, else relative to CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf], exists: impl Fn(&PathBuf) -> bool) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Some(path);
    }
    Some(
        search_dirs.iter()
            .map(|d| d.join(raw))
            .find(|p| exists(p))
            .unwrap_or(path),
    )
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a link in /usr/bin still finds data next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/matype)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/matype)
    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("loaded config from {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
