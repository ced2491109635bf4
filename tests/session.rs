//! End-to-end rounds driven through the library API, no terminal involved.

use matype::config::GameConfig;
use matype::domain::rng::ScriptedRng;
use matype::domain::rules::{DamageRule, Difficulty};
use matype::domain::word::Word;
use matype::domain::wordbank::WordBank;
use matype::sim::event::GameEvent;
use matype::sim::score::ScoreStore;
use matype::sim::session::SessionState;
use matype::sim::step::step;
use matype::sim::world::{Round, RoundSettings, WorldState};

const TICK: f32 = 0.028;

fn word(s: &str) -> Word {
    Word::parse(s).unwrap()
}

fn bank(words: &[&str]) -> WordBank {
    WordBank::from_words(words.iter().map(|s| word(s)))
}

fn settings(damage: DamageRule) -> RoundSettings {
    RoundSettings { damage, ..RoundSettings::default() }
}

#[test]
fn cat_and_dog_spawn_and_cat_is_typed() {
    let b = bank(&["cat", "dog"]);
    let mut round = Round::new(&b, Difficulty::Easy, settings(DamageRule::One), 80);
    assert_eq!(round.pool.words, vec![word("cat"), word("dog")]);

    // First tick fills the empty field, a full cycle later the second word joins.
    let mut rng = ScriptedRng::new(&[0, 10, 1, 20]);
    let (s, ev) = step(SessionState::new(5), &mut round, &b, TICK, &mut rng);
    assert_eq!(ev, vec![GameEvent::Spawned { word: word("cat") }]);
    let (s, ev) = step(s, &mut round, &b, 2.5, &mut rng);
    assert_eq!(ev, vec![GameEvent::Spawned { word: word("dog") }]);
    assert_eq!(round.falling.len(), 2);

    for c in "CaT".chars() {
        assert!(round.type_char(c));
    }
    let (s, ev) = step(s, &mut round, &b, TICK, &mut rng);
    assert_eq!(ev, vec![GameEvent::Hit { word: word("cat"), points: 3 }]);
    assert_eq!(s.score, 3);
    assert_eq!(s.words_killed, 1);
    assert!(round.prompt.is_empty());
    assert!(round.falling.get("dog").is_some());
}

fn miss_four_letter_word(damage: DamageRule) -> SessionState {
    let b = bank(&["bird", "cat"]);
    let mut round = Round::new(&b, Difficulty::Easy, settings(damage), 80);
    round.falling.insert(word("bird"), 0);
    round.falling.advance(24.0); // past the bottom edge at the default fall speed
    round.falling.insert(word("cat"), 10);

    let mut rng = ScriptedRng::new(&[0]);
    let (s, ev) = step(SessionState::new(5), &mut round, &b, TICK, &mut rng);
    assert_eq!(ev, vec![GameEvent::Missed { word: word("bird"), damage: damage.damage(4) }]);
    assert!(round.falling.get("cat").is_some());
    s
}

#[test]
fn missed_word_costs_one_health_by_default() {
    assert_eq!(miss_four_letter_word(DamageRule::One).health, 4);
}

#[test]
fn missed_word_costs_its_length_under_length_rule() {
    assert_eq!(miss_four_letter_word(DamageRule::WordLength).health, 1);
}

#[test]
fn tenth_kill_reaches_level_two() {
    let b = bank(&["at", "cat", "dog", "bird", "horse", "bottle"]);
    let mut round = Round::new(&b, Difficulty::Easy, settings(DamageRule::One), 80);
    let mut rng = fastrand::Rng::with_seed(5);
    let mut s = SessionState::new(5);
    let mut level_ups = vec![];

    for _ in 0..10 {
        // Keep exactly one word on screen and type it.
        if round.falling.is_empty() {
            let (next, _) = step(s, &mut round, &b, TICK, &mut rng);
            s = next;
        }
        let target = round.falling.iter().next().unwrap().word.clone();
        for c in target.as_str().chars() {
            round.type_char(c);
        }
        let (next, ev) = step(s, &mut round, &b, TICK, &mut rng);
        s = next;
        level_ups.extend(ev.into_iter().filter(|e| matches!(e, GameEvent::LevelUp { .. })));
    }

    assert_eq!(s.words_killed, 10);
    assert_eq!(s.level, 2);
    assert_eq!(level_ups, vec![GameEvent::LevelUp { level: 2 }]);
    let longest = round.pool.words.iter().map(Word::len).max().unwrap();
    assert_eq!(longest, 5);
    assert!(round.pool.words.iter().all(|w| (2..=5).contains(&w.len())));
    assert!((round.spawn_interval - 2.5 * 0.99).abs() < 1e-6);
}

#[test]
fn health_is_monotonic_and_words_keep_distinct_first_letters() {
    let b = WordBank::embedded();
    let mut round = Round::new(&b, Difficulty::Medium, settings(DamageRule::One), 70);
    let mut rng = fastrand::Rng::with_seed(42);
    let mut s = SessionState::new(5);
    let mut ticks = 0;

    while round.is_running() {
        // Now and then type the newest word, to mix hits in.
        if ticks % 90 == 0 {
            let youngest = round
                .falling
                .iter()
                .min_by(|a, b| a.age.total_cmp(&b.age))
                .map(|f| f.word.clone());
            if let Some(w) = youngest {
                round.prompt.clear();
                for c in w.as_str().chars() {
                    round.type_char(c);
                }
            }
        }
        let before = s.health;
        let (next, _) = step(s, &mut round, &b, 0.1, &mut rng);
        assert!(next.health <= before);
        assert!(next.health <= next.max_health);

        let mut letters: Vec<char> = round.falling.iter().map(|f| f.word.first_letter()).collect();
        let n = letters.len();
        letters.dedup();
        assert_eq!(letters.len(), n);

        s = next;
        ticks += 1;
    }
    assert!(s.is_dead());
    assert!(s.score > 0);
}

#[test]
fn lower_score_leaves_high_score_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScoreStore::new(dir.path());
    assert!(store.write_score(80).unwrap());
    assert!(!store.write_score(79).unwrap());
    assert_eq!(store.load_score(), 80);

    let reopened = ScoreStore::new(dir.path());
    assert_eq!(reopened.load_score(), 80);
}

#[test]
fn configured_health_carries_into_a_full_game() {
    let cfg = GameConfig::from_toml_str("[rules]\nmax_health = 3\n").unwrap();
    let b = bank(&["cat", "dog"]);
    let mut world = WorldState::new(&cfg, &b, 0);
    world.start_round(&cfg, &b, Difficulty::Hard);
    assert_eq!(world.session.health, 3);
    assert_eq!(world.session.max_health, 3);

    let mut rng = ScriptedRng::new(&[0]);
    let mut ended = false;
    for _ in 0..10_000 {
        let (next, ev) = step(world.session, &mut world.round, &b, 0.2, &mut rng);
        world.session = next;
        if ev.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            ended = true;
            break;
        }
    }
    assert!(ended);
    assert!(!world.round.is_running());
    assert_eq!(world.session.health, 0);
}
