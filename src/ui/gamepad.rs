/// Gamepad input using gilrs (optional `gamepad` feature).
///
/// A pad cannot type, so it only drives the menus:
///   D-pad / Left Stick up, down  →  Title menu cursor
///   D-pad / Left Stick left, right  →  Browse backdrops
///   Start / A                    →  Confirm
///   Select / B                   →  Cancel (back to title)
///   Start                        →  Pause while playing
///
/// Button names for the three actions come from `[gamepad]` in config.toml.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use matype::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face and shoulder buttons that can be bound to an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Directions, from the D-pad or the left stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Bound buttons per action.
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    pause: Vec<Btn>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback.to_vec() } else { parsed }
        }
        ActionMap {
            confirm: parse_list(&cfg.confirm, &[Btn::Start, Btn::A]),
            cancel: parse_list(&cfg.cancel, &[Btn::Select, Btn::B]),
            pause: parse_list(&cfg.pause, &[Btn::Start]),
        }
    }
}

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update()`, indexed by `Btn`.
    pressed: [bool; BTN_COUNT],
    /// Directions that went active since the last `update()`.
    dir_pressed: [bool; 4],
    /// D-pad directions currently held.
    dpad_held: [bool; 4],
    /// Stick directions currently past the deadzone.
    stick_held: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                if let Some((_, pad)) = g.gamepads().next() {
                    log::info!("gamepad found: {}", pad.name());
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            pressed: [false; BTN_COUNT],
            dir_pressed: [false; 4],
            dpad_held: [false; 4],
            stick_held: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
        }
    }

    /// Poll pending pad events. Call once per frame.
    pub fn update(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.dir_pressed = [false; 4];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => log::info!("gamepad connected"),
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.release_all();
                }
                _ => {}
            }
        }

        let now = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for (i, held) in now.into_iter().enumerate() {
            if held && !self.stick_held[i] {
                self.dir_pressed[i] = true;
            }
            self.stick_held[i] = held;
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, down: bool) {
        let dir = match btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            let i = d as usize;
            if down && !self.dpad_held[i] {
                self.dir_pressed[i] = true;
            }
            self.dpad_held[i] = down;
            return;
        }
        if let (true, Some(b)) = (down, Btn::from_gilrs(btn)) {
            self.pressed[b as usize] = true;
        }
    }

    // ── Action queries ──

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.pressed[b as usize])
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.cancel)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_pressed(&self.action_map.pause)
    }

    pub fn dir_pressed(&self, dir: Dir) -> bool {
        self.dir_pressed[dir as usize]
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.dir_pressed = [false; 4];
        self.dpad_held = [false; 4];
        self.stick_held = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
