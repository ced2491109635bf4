/// Word values.
/// A word is a non-empty run of lowercase ASCII letters; anything else is
/// rejected at construction so the rest of the game can rely on it.

use std::fmt;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Word(String);

#[allow(clippy::len_without_is_empty)]
impl Word {
    /// Validate `text` as a word. Upper-case input is not folded here:
    /// callers that accept free text lower-case it first.
    pub fn parse(text: &str) -> Option<Word> {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_lowercase()) {
            Some(Word(text.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of letters (== terminal columns).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first_letter(&self) -> char {
        // Non-empty by construction.
        self.0.as_bytes()[0] as char
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
