/// Events emitted during a round step.
/// The presentation layer consumes these for sound and status messages.

use crate::domain::word::Word;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Spawned { word: Word },
    Hit { word: Word, points: u32 },
    Missed { word: Word, damage: u32 },
    LevelUp { level: u32 },
    GameOver { score: u32 },
}
