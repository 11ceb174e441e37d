//! Key bindings and input modes

use crossterm::event::KeyCode;

/// Navigation scheme chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBindings {
    #[default]
    Arrows,
    /// Arrows plus h/j/k/l
    Vim,
}

/// Whether keys drive the app or go into the active input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Cursor and tab movement produced by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Previous row, or previous role in the picker
    Up,
    Down,
    PrevTab,
    NextTab,
}

impl KeyBindings {
    pub fn from_vim_flag(vim: bool) -> Self {
        if vim { Self::Vim } else { Self::Arrows }
    }

    /// Map a key to a movement; arrows and Tab work in every scheme
    pub fn navigation(&self, key: KeyCode) -> Option<Navigation> {
        match (self, key) {
            (_, KeyCode::Up) => Some(Navigation::Up),
            (_, KeyCode::Down) => Some(Navigation::Down),
            (_, KeyCode::Left | KeyCode::BackTab) => Some(Navigation::PrevTab),
            (_, KeyCode::Right | KeyCode::Tab) => Some(Navigation::NextTab),
            (Self::Vim, KeyCode::Char('k')) => Some(Navigation::Up),
            (Self::Vim, KeyCode::Char('j')) => Some(Navigation::Down),
            (Self::Vim, KeyCode::Char('h')) => Some(Navigation::PrevTab),
            (Self::Vim, KeyCode::Char('l')) => Some(Navigation::NextTab),
            _ => None,
        }
    }
}
