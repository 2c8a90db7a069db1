//! Key bindings: normal and vim-style, mapped onto the core's input events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tetris2048::InputEvent;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(InputEvent),
    Quit,
    None,
}

/// Map key event to an action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    let event = match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => return Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => InputEvent::Left,
        KeyCode::Right | KeyCode::Char('l') => InputEvent::Right,
        KeyCode::Down | KeyCode::Char('j') => InputEvent::Down,
        KeyCode::Up | KeyCode::Char('k' | 'i') => InputEvent::Rotate,
        KeyCode::Enter | KeyCode::Char(' ') => InputEvent::HardDrop,
        KeyCode::Char('p' | 'P') => InputEvent::Pause,
        KeyCode::Char('r' | 'R') => InputEvent::Restart,
        _ => return Action::None,
    };
    Action::Game(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_and_vim_keys_agree() {
        assert_eq!(key_to_action(press(KeyCode::Left)), key_to_action(press(KeyCode::Char('h'))));
        assert_eq!(key_to_action(press(KeyCode::Up)), Action::Game(InputEvent::Rotate));
        assert_eq!(key_to_action(press(KeyCode::Char(' '))), Action::Game(InputEvent::HardDrop));
    }

    #[test]
    fn test_quit_and_unmapped() {
        assert_eq!(key_to_action(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(key_to_action(press(KeyCode::Char('x'))), Action::None);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)),
            Action::None
        );
    }
}
