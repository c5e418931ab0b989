//! Customizable keybindings.
//!
//! Tool hotkeys are single characters, matched case-insensitively and only
//! when neither Ctrl nor Cmd is held. Undo, delete and cancel are fixed.

use serde::{Deserialize, Serialize};

use crate::event::{Key, Modifiers};
use crate::model::ToolMode;

/// What a key press asks the annotator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Ctrl/Cmd+Z
    Undo,
    /// Delete or Backspace
    DeleteSelected,
    /// Escape
    CancelGesture,
    SetTool(ToolMode),
}

/// Keybinding configuration for the tool hotkeys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for the Draw tool
    pub tool_draw: char,
    /// Hotkey for the Select tool
    pub tool_select: char,
    /// Hotkey for the Rectangle tool
    pub tool_rectangle: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_draw: 'd',
            tool_select: 's',
            tool_rectangle: 'r',
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: Key, modifiers: Modifiers) -> Option<ToolMode> {
        let Key::Char(c) = key else {
            return None;
        };
        if modifiers.command() {
            return None;
        }
        let c = c.to_ascii_lowercase();
        [
            (self.tool_draw, ToolMode::Draw),
            (self.tool_select, ToolMode::Select),
            (self.tool_rectangle, ToolMode::Rectangle),
        ]
        .into_iter()
        .find(|(bound, _)| bound.to_ascii_lowercase() == c)
        .map(|(_, tool)| tool)
    }

    /// Resolve a key press to an action.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<KeyAction> {
        match key {
            Key::Char('z' | 'Z') if modifiers.command() => Some(KeyAction::Undo),
            Key::Delete | Key::Backspace => Some(KeyAction::DeleteSelected),
            Key::Escape => Some(KeyAction::CancelGesture),
            _ => self
                .tool_for_key(key, modifiers)
                .map(KeyAction::SetTool),
        }
    }

    /// Describe the first problem with these bindings, if any.
    pub fn conflict(&self) -> Option<String> {
        let keys = [
            ("draw", self.tool_draw),
            ("select", self.tool_select),
            ("rectangle", self.tool_rectangle),
        ];
        for (i, (name, key)) in keys.iter().enumerate() {
            if !key.is_ascii_graphic() {
                return Some(format!("{name} hotkey {key:?} is not a printable ASCII key"));
            }
            if let Some((other, _)) = keys[i + 1..]
                .iter()
                .find(|(_, k)| k.eq_ignore_ascii_case(key))
            {
                return Some(format!("{name} and {other} share the hotkey {key:?}"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_keys() {
        let bindings = KeyBindings::default();
        let none = Modifiers::default();
        assert_eq!(bindings.tool_for_key(Key::Char('d'), none), Some(ToolMode::Draw));
        assert_eq!(bindings.tool_for_key(Key::Char('S'), none), Some(ToolMode::Select));
        assert_eq!(
            bindings.tool_for_key(Key::Char('r'), none),
            Some(ToolMode::Rectangle)
        );
        assert_eq!(bindings.tool_for_key(Key::Char('x'), none), None);
    }

    #[test]
    fn test_command_keys_do_not_switch_tools() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.tool_for_key(Key::Char('r'), Modifiers::ctrl()), None);
    }

    #[test]
    fn test_actions() {
        let bindings = KeyBindings::default();
        let none = Modifiers::default();
        assert_eq!(
            bindings.action_for(Key::Char('z'), Modifiers::ctrl()),
            Some(KeyAction::Undo)
        );
        assert_eq!(
            bindings.action_for(Key::Char('Z'), Modifiers::meta()),
            Some(KeyAction::Undo)
        );
        assert_eq!(bindings.action_for(Key::Char('z'), none), None);
        assert_eq!(
            bindings.action_for(Key::Backspace, none),
            Some(KeyAction::DeleteSelected)
        );
        assert_eq!(
            bindings.action_for(Key::Delete, none),
            Some(KeyAction::DeleteSelected)
        );
        assert_eq!(
            bindings.action_for(Key::Escape, none),
            Some(KeyAction::CancelGesture)
        );
        assert_eq!(bindings.action_for(Key::Other, none), None);
    }

    #[test]
    fn test_custom_bindings() {
        let bindings = KeyBindings {
            tool_draw: 'p',
            ..KeyBindings::default()
        };
        let none = Modifiers::default();
        assert_eq!(bindings.tool_for_key(Key::Char('p'), none), Some(ToolMode::Draw));
        assert_eq!(bindings.tool_for_key(Key::Char('d'), none), None);
    }

    #[test]
    fn test_conflicts() {
        assert_eq!(KeyBindings::default().conflict(), None);

        let clash = KeyBindings {
            tool_select: 'D',
            ..KeyBindings::default()
        };
        assert!(clash.conflict().is_some());

        let blank = KeyBindings {
            tool_rectangle: ' ',
            ..KeyBindings::default()
        };
        assert!(blank.conflict().is_some());
    }
}
