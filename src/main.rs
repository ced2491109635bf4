/// Entry point and game loop.

mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use matype::config::GameConfig;
use matype::domain::rules::Difficulty;
use matype::domain::wordbank::WordBank;
use matype::sim::event::GameEvent;
use matype::sim::score::ScoreStore;
use matype::sim::step;
use matype::sim::world::{Phase, WorldState};
use ui::backdrop::{Backdrop, Browse};
use ui::gamepad::{Dir, GamepadState};
use ui::input::{InputState, KeyAction};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Longest slice of time one tick may simulate. A suspended process must not
/// drop every word at once when it resumes.
const MAX_DT: f32 = 0.25;

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

/// Message durations, in ticks.
const MSG_SHORT: u32 = 45;
const MSG_LONG: u32 = 120;

/// Long-lived collaborators shared by every handler.
struct Context<'a> {
    config: &'a GameConfig,
    bank: &'a WordBank,
    store: &'a ScoreStore,
    sound: Option<&'a SoundEngine>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let bank = load_bank(&config);
    let store = ScoreStore::locate(config.score_dir.as_deref());
    log::info!("high score file: {}", store.path().display());

    let mut world = WorldState::new(&config, &bank, store.load_score());
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let ctx = Context {
        config: &config,
        bank: &bank,
        store: &store,
        sound: sound.as_ref(),
    };

    let result = game_loop(&mut world, &mut renderer, &ctx);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing MaType!");
    println!("Highscore: {}", world.high_score);
}

/// Word bank from the configured file, or the built-in list when none is
/// configured or the file is unusable.
fn load_bank(config: &GameConfig) -> WordBank {
    let Some(path) = &config.words_file else {
        return WordBank::embedded();
    };
    match WordBank::load(path) {
        Ok(bank) if !bank.is_empty() => {
            log::info!("loaded {} words from {}", bank.len(), path.display());
            bank
        }
        Ok(_) => {
            log::warn!("{} holds no usable words; using the built-in list", path.display());
            WordBank::embedded()
        }
        Err(e) => {
            log::warn!("{e}; using the built-in list");
            WordBank::embedded()
        }
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let timing = &ctx.config.timing;
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&ctx.config.gamepad);
    let mut rng = fastrand::Rng::new();
    let mut backdrop = Backdrop::new(timing.backdrop_period_secs, timing.backdrop_fade_secs, &mut rng);
    let tick_rate = Duration::from_millis(timing.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &mut backdrop, &kb, &gp, ctx) {
            break;
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            last_tick = Instant::now();
            let dt = elapsed.as_secs_f32().min(MAX_DT);

            world.anim_tick = world.anim_tick.wrapping_add(1);
            world.tick_message();

            if world.phase == Phase::Playing && !world.paused {
                backdrop.update(dt);
                let (session, events) = step::step(world.session, &mut world.round, ctx.bank, dt, &mut rng);
                world.session = session;
                process_events(world, &events, ctx);
            }
        }

        renderer.render(world, &backdrop)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_events(world: &mut WorldState, events: &[GameEvent], ctx: &Context) {
    for event in events {
        match event {
            GameEvent::Spawned { .. } => {
                if let Some(s) = ctx.sound { s.play_spawn(); }
            }
            GameEvent::Hit { .. } => {
                if let Some(s) = ctx.sound { s.play_hit(); }
            }
            GameEvent::Missed { word, damage } => {
                log::debug!("missed {word} (-{damage} health)");
                if let Some(s) = ctx.sound { s.play_miss(); }
            }
            GameEvent::LevelUp { level } => {
                if let Some(s) = ctx.sound { s.play_level_up(); }
                world.set_message(&format!("Level {level}"), MSG_SHORT);
            }
            GameEvent::GameOver { score } => {
                if let Some(s) = ctx.sound { s.play_game_over(); }
                log::info!("game over with {score} points");
                record_score(world, *score, ctx.store);
                world.phase = Phase::GameOver;
            }
        }
    }
}

/// Hand a finished round's score to the store.
fn record_score(world: &mut WorldState, score: u32, store: &ScoreStore) {
    match store.write_score(score) {
        Ok(true) => {
            world.high_score = score;
            world.new_high_score = true;
        }
        Ok(false) => {}
        Err(e) => {
            log::warn!("{e}");
            world.set_message("Could not save high score", MSG_LONG);
        }
    }
}

/// Keyboard and pad handling for the current phase. Returns true to quit.
fn handle_meta(
    world: &mut WorldState,
    backdrop: &mut Backdrop,
    kb: &InputState,
    gp: &GamepadState,
    ctx: &Context,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let cancel = kb.was_pressed(KeyCode::Esc) || gp.cancel_pressed();
    let blip = || {
        if let Some(s) = ctx.sound { s.play_blip(); }
    };

    match world.phase {
        // ── Title menu ──
        Phase::Title => {
            let entries = Difficulty::ALL.len() + 1;
            if kb.was_pressed(KeyCode::Up) || gp.dir_pressed(Dir::Up) {
                world.menu_cursor = (world.menu_cursor + entries - 1) % entries;
                blip();
            }
            if kb.was_pressed(KeyCode::Down) || gp.dir_pressed(Dir::Down) {
                world.menu_cursor = (world.menu_cursor + 1) % entries;
                blip();
            }
            if cancel {
                return true;
            }
            if confirm {
                match Difficulty::ALL.get(world.menu_cursor) {
                    Some(&difficulty) => world.start_round(ctx.config, ctx.bank, difficulty),
                    None => return true,
                }
            }
        }

        // ── In a round ──
        Phase::Playing => {
            // ESC keeps the score and goes back to the menu.
            if cancel {
                world.round.quit();
                let score = world.session.score;
                record_score(world, score, ctx.store);
                world.paused = false;
                world.phase = Phase::Title;
                return false;
            }
            if kb.was_pressed(KeyCode::Enter) || gp.pause_pressed() {
                world.paused = !world.paused;
                return false;
            }
            if world.paused {
                return false;
            }

            if kb.was_pressed(KeyCode::Left) || gp.dir_pressed(Dir::Left) {
                backdrop.browse(Browse::Backward);
            }
            if kb.was_pressed(KeyCode::Right) || gp.dir_pressed(Dir::Right) {
                backdrop.browse(Browse::Forward);
            }
            for action in kb.actions() {
                match action {
                    KeyAction::Letter(c) => {
                        world.round.type_char(c);
                    }
                    KeyAction::Backspace => world.round.backspace(),
                    KeyAction::Other(_) => {}
                }
            }
        }

        // ── Final score shown ──
        Phase::GameOver => {
            if confirm || cancel {
                world.phase = Phase::Title;
            }
        }
    }

    false
}
