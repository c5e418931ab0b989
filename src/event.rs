//! Input events delivered by the canvas host.

use annotrace_vision::Point;
use serde::{Deserialize, Serialize};

/// Events the annotator responds to. Positions are canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary pointer pressed.
    PointerDown { position: Point },
    /// Pointer moved, pressed or not.
    PointerMove { position: Point },
    /// Primary pointer released.
    PointerUp { position: Point },
    /// Wheel scrolled; negative delta zooms in.
    Wheel { delta: f32 },
    /// Keyboard key pressed.
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// Keyboard keys the annotator distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Char(char),
    Escape,
    Backspace,
    Delete,
    /// Anything else; never bound.
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Backspace" => Key::Backspace,
            "Delete" | "Del" => Key::Delete,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other,
                }
            }
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::default()
        }
    }
}
