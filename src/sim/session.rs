/// Per-game tallies: score, health, level and kills.
///
/// A plain value. `step` takes it by value and hands back the next one, so a
/// game can be replayed tick by tick without a terminal.

use crate::domain::rules;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub score: u32,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub words_killed: u32,
}

impl SessionState {
    pub fn new(max_health: u32) -> Self {
        SessionState {
            score: 0,
            health: max_health,
            max_health,
            level: 1,
            words_killed: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Health as a fraction of the maximum, for the HUD colour.
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn record_kill(&mut self, word_len: usize) {
        self.score += word_len as u32;
        self.words_killed += 1;
    }

    /// Recompute the level from kills. Returns true when it went up.
    pub fn update_level(&mut self, words_per_level: u32) -> bool {
        let old = self.level;
        self.level = rules::level_for(self.words_killed, words_per_level);
        self.level > old
    }
}
