/// Word bank: words bucketed by length, compiled into the active pool.
///
/// ## Word file format (`words.toml`):
///   ```toml
///   [words]
///   2 = ["an", "at"]
///   3 = ["cat", "dog"]
///   ```
///
/// Keys are informational; every word is re-bucketed by its own length on
/// load, and tokens that are not valid words are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::rules::{self, Difficulty};
use super::word::Word;

/// Default cap on the ingested dictionary size.
pub const CORPUS_CAP: usize = 1300;

const EMBEDDED_WORDS: &str = include_str!("../../data/words.toml");

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum WordBankError {
    Io { path: String, source: std::io::Error },
    Parse(toml::de::Error),
}

impl fmt::Display for WordBankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "could not read word file {path}: {source}"),
            Self::Parse(e) => write!(f, "word file parse error: {e}"),
        }
    }
}

impl std::error::Error for WordBankError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Types
// ══════════════════════════════════════════════════════════════

/// On-disk schema.
#[derive(Serialize, Deserialize, Debug, Default)]
struct WordFile {
    #[serde(default)]
    words: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordBank {
    buckets: BTreeMap<usize, BTreeSet<Word>>,
}

/// Candidate words for the current level plus their distinct first letters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pool {
    pub words: Vec<Word>,
    pub first_letters: BTreeSet<char>,
}

impl Pool {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════
// Construction
// ══════════════════════════════════════════════════════════════

impl WordBank {
    /// Bucket an arbitrary collection of words by length.
    pub fn from_words<I: IntoIterator<Item = Word>>(words: I) -> Self {
        let mut bank = WordBank::default();
        for w in words {
            bank.insert(w);
        }
        bank
    }

    pub fn insert(&mut self, word: Word) {
        self.buckets.entry(word.len()).or_default().insert(word);
    }

    /// The bank compiled into the binary.
    pub fn embedded() -> Self {
        // The embedded file is covered by tests; a broken one yields an empty bank.
        Self::from_toml(EMBEDDED_WORDS).unwrap_or_default()
    }

    pub fn from_toml(text: &str) -> Result<Self, WordBankError> {
        let file: WordFile = toml::from_str(text).map_err(WordBankError::Parse)?;
        let words = file
            .words
            .into_values()
            .flatten()
            .filter_map(|w| Word::parse(w.trim()));
        Ok(Self::from_words(words))
    }

    pub fn load(path: &Path) -> Result<Self, WordBankError> {
        let text = std::fs::read_to_string(path).map_err(|source| WordBankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> String {
        let file = WordFile {
            words: self
                .buckets
                .iter()
                .map(|(len, set)| (len.to_string(), set.iter().map(|w| w.to_string()).collect()))
                .collect(),
        };
        toml::to_string(&file).unwrap_or_default()
    }
}

// ══════════════════════════════════════════════════════════════
// Queries
// ══════════════════════════════════════════════════════════════

impl WordBank {
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket(&self, len: usize) -> Option<&BTreeSet<Word>> {
        self.buckets.get(&len)
    }

    /// Non-empty buckets, shortest words first.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, &BTreeSet<Word>)> {
        self.buckets.iter().map(|(len, set)| (*len, set))
    }

    /// Union of all buckets whose length is in play at `level`.
    /// Deterministic: words come out sorted by length, then alphabetically.
    pub fn compile(&self, level: u32, difficulty: Difficulty) -> Pool {
        let words: Vec<Word> = self
            .buckets
            .range(rules::length_range(level, difficulty))
            .flat_map(|(_, set)| set.iter().cloned())
            .collect();
        let first_letters = words.iter().map(Word::first_letter).collect();
        Pool { words, first_letters }
    }
}

// ══════════════════════════════════════════════════════════════
// Dictionary ingestion
// ══════════════════════════════════════════════════════════════

/// Build a bank from raw dictionary text: lower-case every whitespace token,
/// shuffle, keep purely alphabetic tokens, cap at `cap`, bucket by length.
pub fn ingest<R: RandomSource>(text: &str, rng: &mut R, cap: usize) -> WordBank {
    let mut tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    rng.shuffle(&mut tokens);
    let words = tokens
        .iter()
        .filter_map(|t| Word::parse(t))
        .take(cap);
    WordBank::from_words(words)
}
