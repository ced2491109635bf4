/// Falling-word set and spawn policy.
///
/// Entries are keyed by first letter. That makes "no two falling words
/// share a first letter" structural: a typed first character can only ever
/// be heading towards one word.
///
/// Coordinates:
///   - `x`: terminal column of the word's first letter
///   - `age`: seconds since spawn; vertical position is `age * fall_speed`
///       in field heights, so 0.0 is the top and 1.0 the bottom edge.

use std::collections::BTreeMap;

use crate::domain::rng::RandomSource;
use crate::domain::word::Word;
use crate::domain::wordbank::Pool;

#[derive(Clone, Debug, PartialEq)]
pub struct FallingWord {
    pub word: Word,
    pub x: usize,
    pub age: f32,
}

impl FallingWord {
    /// Vertical position in field heights.
    pub fn position(&self, fall_speed: f32) -> f32 {
        self.age * fall_speed
    }
}

/// Words that left the set during a sweep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sweep {
    pub hits: Vec<Word>,
    pub misses: Vec<Word>,
}

#[derive(Clone, Debug, Default)]
pub struct FallingSet {
    words: BTreeMap<char, FallingWord>,
}

impl FallingSet {
    pub fn new() -> Self {
        FallingSet::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Entries in first-letter order.
    pub fn iter(&self) -> impl Iterator<Item = &FallingWord> {
        self.words.values()
    }

    pub fn get(&self, word: &str) -> Option<&FallingWord> {
        let first = word.chars().next()?;
        self.words.get(&first).filter(|f| f.word.as_str() == word)
    }

    pub fn has_first_letter(&self, c: char) -> bool {
        self.words.contains_key(&c)
    }

    /// Does any falling word start with `prefix`? An empty prefix matches
    /// as long as something is falling.
    pub fn any_starts_with(&self, prefix: &str) -> bool {
        self.words.values().any(|f| f.word.starts_with(prefix))
    }

    /// Every first letter in the pool is already on screen.
    pub fn is_saturated(&self, pool: &Pool) -> bool {
        pool.first_letters.iter().all(|c| self.words.contains_key(c))
    }

    /// Insert a word directly. Refused when its first letter is taken.
    pub fn insert(&mut self, word: Word, x: usize) -> bool {
        let key = word.first_letter();
        if self.words.contains_key(&key) {
            return false;
        }
        self.words.insert(key, FallingWord { word, x, age: 0.0 });
        true
    }

    // ── Spawn ──

    /// Pick a word whose first letter is free and start it falling.
    ///
    /// Rejection sampling, bounded by the number of distinct first letters in
    /// the pool. Returns `None` when the pool is empty, saturated, or every
    /// draw was rejected; the caller retries on the next spawn cycle.
    pub fn try_spawn<R: RandomSource>(
        &mut self,
        pool: &Pool,
        rng: &mut R,
        field_width: usize,
    ) -> Option<Word> {
        if pool.is_empty() || self.is_saturated(pool) {
            return None;
        }
        for _ in 0..pool.first_letters.len() {
            let candidate = &pool.words[rng.below(pool.words.len())];
            if self.has_first_letter(candidate.first_letter()) {
                continue;
            }
            let x = spawn_column(candidate.len(), field_width, rng);
            let word = candidate.clone();
            self.insert(word.clone(), x);
            return Some(word);
        }
        None
    }

    // ── Per-tick updates ──

    pub fn advance(&mut self, dt: f32) {
        for f in self.words.values_mut() {
            f.age += dt;
        }
    }

    /// Remove and report words that fell past the bottom (misses) or equal
    /// the lower-cased prompt (hits). Misses win over hits on the same tick.
    pub fn sweep(&mut self, prompt: &str, fall_speed: f32) -> Sweep {
        let typed = prompt.to_ascii_lowercase();
        let mut out = Sweep::default();
        self.words.retain(|_, f| {
            if f.position(fall_speed) > 1.0 {
                out.misses.push(f.word.clone());
                false
            } else if !typed.is_empty() && f.word.as_str() == typed {
                out.hits.push(f.word.clone());
                false
            } else {
                true
            }
        });
        out
    }
}

/// Random column such that the whole word fits inside the field.
fn spawn_column<R: RandomSource>(word_len: usize, field_width: usize, rng: &mut R) -> usize {
    let span = field_width.saturating_sub(word_len);
    if span == 0 {
        0
    } else {
        rng.below(span + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rng::ScriptedRng;
    use crate::domain::rules::Difficulty;
    use crate::domain::wordbank::WordBank;

    fn w(s: &str) -> Word {
        Word::parse(s).unwrap()
    }

    fn pool(words: &[&str]) -> Pool {
        WordBank::from_words(words.iter().map(|s| w(s))).compile(10, Difficulty::Hard)
    }

    #[test]
    fn spawn_picks_scripted_word_and_column() {
        let p = pool(&["cat", "dog"]); // sorted: cat, dog
        let mut set = FallingSet::new();
        let mut rng = ScriptedRng::new(&[1, 4]);
        let got = set.try_spawn(&p, &mut rng, 20).unwrap();
        assert_eq!(got.as_str(), "dog");
        let f = set.get("dog").unwrap();
        assert_eq!(f.x, 4);
        assert_eq!(f.age, 0.0);
    }

    #[test]
    fn spawn_rejects_taken_first_letter() {
        let p = pool(&["cat", "cow", "dog"]); // cat, cow, dog
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        // draws: cow (rejected), dog (accepted), column
        let mut rng = ScriptedRng::new(&[1, 2, 0]);
        let got = set.try_spawn(&p, &mut rng, 20).unwrap();
        assert_eq!(got.as_str(), "dog");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn spawn_gives_up_after_bounded_attempts() {
        let p = pool(&["cat", "cow", "dog"]);
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        // Two distinct first letters → two attempts, both land on 'c'.
        let mut rng = ScriptedRng::new(&[0, 1, 2]);
        assert!(set.try_spawn(&p, &mut rng, 20).is_none());
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn spawn_saturated_returns_none_without_drawing() {
        let p = pool(&["cat", "dog"]);
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        set.insert(w("dog"), 0);
        let mut rng = ScriptedRng::new(&[0]);
        assert!(set.is_saturated(&p));
        assert!(set.try_spawn(&p, &mut rng, 20).is_none());
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn spawn_from_empty_pool_is_none() {
        let mut set = FallingSet::new();
        let mut rng = ScriptedRng::new(&[0]);
        assert!(set.try_spawn(&Pool::default(), &mut rng, 20).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn spawn_column_fits_word() {
        let mut rng = ScriptedRng::new(&[1000]);
        // span = 10 - 3 = 7 → 1000 % 8
        assert_eq!(spawn_column(3, 10, &mut rng), 1000 % 8);
        assert_eq!(spawn_column(12, 10, &mut rng), 0);
    }

    #[test]
    fn first_letters_stay_unique_under_random_spawning() {
        let bank = WordBank::embedded();
        let p = bank.compile(5, Difficulty::Hard);
        let mut set = FallingSet::new();
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..500 {
            set.try_spawn(&p, &mut rng, 80);
            let mut letters: Vec<char> = set.iter().map(|f| f.word.first_letter()).collect();
            let n = letters.len();
            letters.dedup();
            assert_eq!(letters.len(), n);
            for f in set.iter() {
                assert!(f.x + f.word.len() <= 80);
            }
        }
    }

    #[test]
    fn insert_refuses_duplicate_first_letter() {
        let mut set = FallingSet::new();
        assert!(set.insert(w("cat"), 0));
        assert!(!set.insert(w("cow"), 3));
        assert!(set.get("cow").is_none());
        assert!(set.get("cat").is_some());
    }

    #[test]
    fn advance_ages_every_word() {
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        set.insert(w("dog"), 0);
        set.advance(0.5);
        set.advance(0.25);
        assert!(set.iter().all(|f| (f.age - 0.75).abs() < 1e-6));
    }

    #[test]
    fn sweep_classifies_hits_and_misses() {
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        set.insert(w("dog"), 0);
        set.insert(w("eel"), 0);
        set.advance(1.0);
        // make "dog" old enough to have fallen out
        set.words.get_mut(&'d').unwrap().age = 30.0;

        let sweep = set.sweep("CAT", 0.05);
        assert_eq!(sweep.hits, vec![w("cat")]);
        assert_eq!(sweep.misses, vec![w("dog")]);
        assert_eq!(set.len(), 1);
        assert!(set.get("eel").is_some());
    }

    #[test]
    fn sweep_prefers_miss_over_hit() {
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        set.advance(100.0);
        let sweep = set.sweep("cat", 0.05);
        assert!(sweep.hits.is_empty());
        assert_eq!(sweep.misses, vec![w("cat")]);
    }

    #[test]
    fn sweep_with_empty_prompt_keeps_words() {
        let mut set = FallingSet::new();
        set.insert(w("cat"), 0);
        let sweep = set.sweep("", 0.05);
        assert_eq!(sweep, Sweep::default());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn prefix_queries() {
        let mut set = FallingSet::new();
        assert!(!set.any_starts_with(""));
        set.insert(w("horse"), 0);
        assert!(set.any_starts_with(""));
        assert!(set.any_starts_with("ho"));
        assert!(!set.any_starts_with("hx"));
    }
}
