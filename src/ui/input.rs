/// Keyboard input collector.
///
/// Typing needs every key press, not a held-key view: the same letter typed
/// twice within one frame must reach the prompt twice, and a held Backspace
/// should keep deleting. So each frame keeps the ordered list of Press and
/// Repeat events and derives everything else from it.
///
/// Release events (reported by terminals with keyboard enhancement) are
/// dropped, and so are resize events: the renderer reads the terminal size
/// every frame.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One thing the player did at the keyboard this frame, in arrival order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyAction {
    Letter(char),
    Backspace,
    Other(KeyCode),
}

pub struct InputState {
    /// Press/Repeat events collected during the most recent drain, in order.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            raw_events: Vec::with_capacity(16),
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the
    /// simulation tick.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.raw_events.push(key);
                }
                _ => {}
            }
        }
    }

    /// This frame's key presses mapped to prompt-level actions.
    pub fn actions(&self) -> impl Iterator<Item = KeyAction> + '_ {
        self.raw_events.iter().map(classify)
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code && !has_command_modifier(k))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

fn has_command_modifier(k: &KeyEvent) -> bool {
    k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn classify(k: &KeyEvent) -> KeyAction {
    match k.code {
        KeyCode::Char(c) if c.is_ascii_alphabetic() && !has_command_modifier(k) => KeyAction::Letter(c),
        KeyCode::Backspace => KeyAction::Backspace,
        code => KeyAction::Other(code),
    }
}
