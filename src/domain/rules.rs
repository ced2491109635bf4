/// Game rules: difficulty tiers, damage, levels and word-length ranges.
///
/// Everything here is a pure function of its inputs. The round controller
/// (`sim::step`) and the word bank call into these so the numbers that shape
/// a game live in one place.

use serde::Deserialize;

/// Shortest word ever offered.
pub const MIN_WORD_LEN: usize = 2;

/// Level 1 on Easy allows words up to `1 + LENGTH_SPAN` letters.
pub const LENGTH_SPAN: usize = 3;

/// Spawn cadence never drops below this many seconds.
pub const MIN_SPAWN_INTERVAL: f32 = 0.05;

// ── Difficulty ──

/// Menu choice. The offset widens the word-length range and speeds up the fall.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn offset(self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

// ── Damage ──

/// Health lost per missed word.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DamageRule {
    /// One point per miss.
    #[default]
    One,
    /// As many points as the word has letters.
    WordLength,
}

impl DamageRule {
    pub fn damage(self, word_len: usize) -> u32 {
        match self {
            DamageRule::One => 1,
            DamageRule::WordLength => word_len as u32,
        }
    }
}

// ── Levels ──

/// `level = 1 + words_killed / words_per_level`.
pub fn level_for(words_killed: u32, words_per_level: u32) -> u32 {
    1 + words_killed / words_per_level.max(1)
}

/// Inclusive range of word lengths in play at `level`.
pub fn length_range(level: u32, difficulty: Difficulty) -> std::ops::RangeInclusive<usize> {
    let max = level as usize + LENGTH_SPAN + difficulty.offset() as usize;
    MIN_WORD_LEN..=max
}

/// Seconds between spawns after `level_ups` level increases, floored at
/// `MIN_SPAWN_INTERVAL`.
pub fn spawn_interval(base: f32, decay: f32, level_ups: u32) -> f32 {
    (base * decay.powi(level_ups as i32)).max(MIN_SPAWN_INTERVAL)
}
