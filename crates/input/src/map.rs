//! Key mapping from terminal events to front-end actions.

use crate::types::{Direction, UiAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to front-end actions.
pub fn handle_key_event(key: KeyEvent) -> Option<UiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        // Cursor
        KeyCode::Up | KeyCode::Char('k' | 'K' | 'w' | 'W') => {
            Some(UiAction::Cursor(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S') => {
            Some(UiAction::Cursor(Direction::Down))
        }
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => {
            Some(UiAction::Cursor(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => {
            Some(UiAction::Cursor(Direction::Right))
        }

        KeyCode::Enter | KeyCode::Char(' ') => Some(UiAction::Place),
        KeyCode::Tab | KeyCode::Char('n' | 'N') => Some(UiAction::SkipAnimation),
        KeyCode::Char('r' | 'R') => Some(UiAction::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q' | 'Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
