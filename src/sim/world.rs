/// WorldState: everything the front end needs to run and draw a game.
///
/// ## Layers
///
///   - `Round`: the live rules state of one game: falling words,
///       prompt, active word pool, spawn timer. Rebuilt on
///       every new game.
///   - `SessionState`: score / health / level tallies, threaded through
///       `step::step` by value.
///   - the rest: menu cursor, pause flag, high score, status message.
///
/// Cosmetic state (backdrop fade, colour jitter) lives in `ui`, not here.

use crate::config::GameConfig;
use crate::domain::rules::{DamageRule, Difficulty};
use crate::domain::word::Word;
use crate::domain::wordbank::{Pool, WordBank};
use super::falling::FallingSet;
use super::prompt::PromptBuffer;
use super::session::SessionState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
}

/// Round controller state machine. `Ended` is terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundStatus {
    Running,
    Ended,
}

/// Rule knobs for one round, fixed at round start.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSettings {
    pub spawn_interval: f32,
    pub spawn_decay: f32,
    pub fall_speed: f32,
    pub words_per_level: u32,
    pub damage: DamageRule,
}

impl RoundSettings {
    pub fn from_config(config: &GameConfig, difficulty: Difficulty) -> Self {
        let t = &config.timing;
        RoundSettings {
            spawn_interval: t.spawn_interval_secs,
            spawn_decay: t.spawn_interval_decay,
            fall_speed: t.fall_speed_for(difficulty),
            words_per_level: config.rules.words_per_level,
            damage: config.rules.damage,
        }
    }
}

impl Default for RoundSettings {
    fn default() -> Self {
        RoundSettings::from_config(&GameConfig::default(), Difficulty::Easy)
    }
}

pub struct Round {
    pub difficulty: Difficulty,
    pub settings: RoundSettings,
    pub status: RoundStatus,
    pub falling: FallingSet,
    pub prompt: PromptBuffer,
    pub pool: Pool,
    /// Seconds into the current spawn cycle.
    pub spawn_timer: f32,
    /// Current cycle length; shrinks on every level-up.
    pub spawn_interval: f32,
    /// Playfield width in columns. Bounds spawn columns and prompt width.
    pub field_width: usize,
}

impl Round {
    pub fn new(bank: &WordBank, difficulty: Difficulty, settings: RoundSettings, field_width: usize) -> Self {
        Round {
            difficulty,
            pool: bank.compile(1, difficulty),
            spawn_interval: settings.spawn_interval,
            settings,
            status: RoundStatus::Running,
            falling: FallingSet::new(),
            prompt: PromptBuffer::new(),
            spawn_timer: 0.0,
            field_width,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RoundStatus::Running
    }

    /// Explicit quit: the round ends without further ticks.
    pub fn quit(&mut self) {
        self.status = RoundStatus::Ended;
    }

    /// Feed a typed character into the prompt. Returns whether it was taken.
    pub fn type_char(&mut self, c: char) -> bool {
        self.is_running() && self.prompt.append_char(c, self.field_width)
    }

    pub fn backspace(&mut self) {
        self.prompt.backspace();
    }

    /// True while the prompt is a prefix of some falling word.
    /// The renderer shows the prompt in red otherwise.
    pub fn prompt_on_track(&self) -> bool {
        self.falling.any_starts_with(&self.prompt.lowered())
    }

    /// Falling word currently being typed, if any.
    pub fn target(&self) -> Option<&Word> {
        if self.prompt.is_empty() {
            return None;
        }
        let typed = self.prompt.lowered();
        self.falling.iter().map(|f| &f.word).find(|w| w.starts_with(&typed))
    }

    /// Playfield resized: future spawns and prompt width follow the new size.
    pub fn resize(&mut self, field_width: usize) {
        self.field_width = field_width;
    }
}

pub struct WorldState {
    pub phase: Phase,
    pub paused: bool,
    pub difficulty: Difficulty,
    pub session: SessionState,
    pub round: Round,

    // ── Title menu ──
    /// Index into `Difficulty::ALL`, or `ALL.len()` for Quit.
    pub menu_cursor: usize,
    pub high_score: u32,
    /// Set on game over when the final score beat the stored high score.
    pub new_high_score: bool,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl WorldState {
    pub fn new(config: &GameConfig, bank: &WordBank, high_score: u32) -> Self {
        let difficulty = Difficulty::Easy;
        WorldState {
            phase: Phase::Title,
            paused: false,
            difficulty,
            session: SessionState::new(config.rules.max_health),
            round: Round::new(bank, difficulty, RoundSettings::from_config(config, difficulty), 80),
            menu_cursor: 0,
            high_score,
            new_high_score: false,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    /// Begin a fresh round at `difficulty`, keeping the current field width.
    pub fn start_round(&mut self, config: &GameConfig, bank: &WordBank, difficulty: Difficulty) {
        let width = self.round.field_width;
        self.difficulty = difficulty;
        self.session = SessionState::new(config.rules.max_health);
        self.round = Round::new(bank, difficulty, RoundSettings::from_config(config, difficulty), width);
        self.paused = false;
        self.new_high_score = false;
        self.phase = Phase::Playing;
        self.message.clear();
        self.message_timer = 0;
        log::info!("new round on {} ({} words in pool)", difficulty.label(), self.round.pool.words.len());
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> WordBank {
        WordBank::from_words(["cat", "dog", "horse"].iter().map(|s| Word::parse(s).unwrap()))
    }

    #[test]
    fn settings_scale_fall_speed_with_difficulty() {
        let cfg = GameConfig::default();
        let easy = RoundSettings::from_config(&cfg, Difficulty::Easy);
        let hard = RoundSettings::from_config(&cfg, Difficulty::Hard);
        assert!(hard.fall_speed > easy.fall_speed);
        let expected = cfg.timing.fall_speed + 3.0 * cfg.timing.fall_speed_per_difficulty;
        assert!((hard.fall_speed - expected).abs() < 1e-6);
    }

    #[test]
    fn new_round_compiles_level_one_pool() {
        let r = Round::new(&bank(), Difficulty::Easy, RoundSettings::default(), 40);
        assert_eq!(r.pool.words.len(), 2); // horse is too long for level 1
        assert!(r.is_running());
        assert_eq!(r.spawn_interval, 2.5);
    }

    #[test]
    fn typing_is_bounded_by_field_width() {
        let mut r = Round::new(&bank(), Difficulty::Easy, RoundSettings::default(), 3);
        assert!(r.type_char('a'));
        assert!(r.type_char('b'));
        assert!(!r.type_char('c'));
        r.quit();
        r.backspace();
        assert!(!r.type_char('c'));
    }

    #[test]
    fn target_and_track() {
        let mut r = Round::new(&bank(), Difficulty::Easy, RoundSettings::default(), 40);
        r.falling.insert(Word::parse("cat").unwrap(), 0);
        assert!(r.target().is_none());
        assert!(r.prompt_on_track());
        r.type_char('C');
        assert_eq!(r.target().map(Word::as_str), Some("cat"));
        r.type_char('x');
        assert!(r.target().is_none());
        assert!(!r.prompt_on_track());
    }

    #[test]
    fn start_round_resets_session() {
        let cfg = GameConfig::default();
        let b = bank();
        let mut w = WorldState::new(&cfg, &b, 12);
        w.session.score = 99;
        w.round.resize(50);
        w.start_round(&cfg, &b, Difficulty::Medium);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.session.score, 0);
        assert_eq!(w.round.field_width, 50);
        assert_eq!(w.round.difficulty, Difficulty::Medium);
        assert_eq!(w.high_score, 12);
    }
}
