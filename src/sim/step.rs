/// The step function: advances a round by one tick.
///
/// Processing order:
///   1. Spawn timer (spawn when the cycle wraps; saturation is skipped)
///   2. Age every falling word
///   3. Sweep for hits / misses against the current prompt
///   4. Misses cost health; an empty playfield forces a spawn
///   5. Hits score their length and clear the prompt
///   6. Level recompute (new pool, shorter spawn cycle)
///   7. Game over check
///
/// The session tallies go in by value and come back out, so a game can be
/// replayed from a seed and an input script.

use crate::domain::rng::RandomSource;
use crate::domain::rules;
use crate::domain::wordbank::WordBank;
use super::event::GameEvent;
use super::session::SessionState;
use super::world::{Round, RoundStatus};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: RandomSource>(
    session: SessionState,
    round: &mut Round,
    bank: &WordBank,
    dt: f32,
    rng: &mut R,
) -> (SessionState, Vec<GameEvent>) {
    if round.status == RoundStatus::Ended {
        return (session, vec![]);
    }

    let mut s = session;
    let mut events: Vec<GameEvent> = Vec::new();

    resolve_spawn_timer(round, dt, rng, &mut events);
    round.falling.advance(dt);
    let sweep = round.falling.sweep(round.prompt.as_str(), round.settings.fall_speed);

    for word in sweep.misses {
        let damage = round.settings.damage.damage(word.len());
        s.take_damage(damage);
        events.push(GameEvent::Missed { word, damage });
    }
    if round.falling.is_empty() {
        spawn(round, rng, &mut events);
        round.spawn_timer = 0.0;
    }

    for word in sweep.hits {
        let points = word.len() as u32;
        s.record_kill(word.len());
        round.prompt.clear();
        events.push(GameEvent::Hit { word, points });
    }

    resolve_level(&mut s, round, bank, &mut events);

    if s.is_dead() {
        round.status = RoundStatus::Ended;
        events.push(GameEvent::GameOver { score: s.score });
    }

    (s, events)
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

fn spawn<R: RandomSource>(round: &mut Round, rng: &mut R, events: &mut Vec<GameEvent>) {
    if let Some(word) = round.falling.try_spawn(&round.pool, rng, round.field_width) {
        events.push(GameEvent::Spawned { word });
    }
}

fn resolve_spawn_timer<R: RandomSource>(round: &mut Round, dt: f32, rng: &mut R, events: &mut Vec<GameEvent>) {
    round.spawn_timer += dt;
    if round.spawn_timer >= round.spawn_interval {
        round.spawn_timer %= round.spawn_interval;
        spawn(round, rng, events);
    }
}

fn resolve_level(s: &mut SessionState, round: &mut Round, bank: &WordBank, events: &mut Vec<GameEvent>) {
    if !s.update_level(round.settings.words_per_level) {
        return;
    }
    round.pool = bank.compile(s.level, round.difficulty);
    round.spawn_interval = rules::spawn_interval(round.settings.spawn_interval, round.settings.spawn_decay, s.level - 1);
    log::info!(
        "level {} reached: {} words in pool, new word every {:.3}s",
        s.level, round.pool.words.len(), round.spawn_interval,
    );
    events.push(GameEvent::LevelUp { level: s.level });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
