//! Key routing for the viewer.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    /// Clear the jump box, or quit when it is already empty.
    ClearOrQuit,
    Step(Direction),
    Page(Direction),
    First,
    Last,
    JumpDigit(char),
    JumpBackspace,
    JumpSubmit,
    ToggleHelp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const HELP_BINDINGS: [HelpBinding; 7] = [
    HelpBinding {
        keys: "←/→ h/l",
        description: "previous/next row",
    },
    HelpBinding {
        keys: "PgUp/PgDn",
        description: "move 16 rows",
    },
    HelpBinding {
        keys: "Home/End",
        description: "first/last row",
    },
    HelpBinding {
        keys: "0-9 Enter",
        description: "jump to row",
    },
    HelpBinding {
        keys: "Esc",
        description: "clear jump box / quit",
    },
    HelpBinding {
        keys: "?",
        description: "toggle help",
    },
    HelpBinding {
        keys: "q",
        description: "quit",
    },
];

/// Key map shown by the help overlay, in display order.
#[must_use]
pub const fn help_bindings() -> &'static [HelpBinding] {
    &HELP_BINDINGS
}

/// Map a key event to an action. Key releases and unbound keys map to `None`.
#[must_use]
pub fn resolve_key(key: &KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(InputAction::Quit),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Right | KeyCode::Char('l') => InputAction::Step(Direction::Forward),
        KeyCode::Left | KeyCode::Char('h') => InputAction::Step(Direction::Backward),
        KeyCode::PageDown => InputAction::Page(Direction::Forward),
        KeyCode::PageUp => InputAction::Page(Direction::Backward),
        KeyCode::Home => InputAction::First,
        KeyCode::End => InputAction::Last,
        KeyCode::Char(c) if c.is_ascii_digit() => InputAction::JumpDigit(c),
        KeyCode::Backspace => InputAction::JumpBackspace,
        KeyCode::Enter => InputAction::JumpSubmit,
        KeyCode::Esc => InputAction::ClearOrQuit,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_vi_keys_step() {
        for code in [KeyCode::Right, KeyCode::Char('l')] {
            assert_eq!(
                resolve_key(&key(code)),
                Some(InputAction::Step(Direction::Forward))
            );
        }
        for code in [KeyCode::Left, KeyCode::Char('h')] {
            assert_eq!(
                resolve_key(&key(code)),
                Some(InputAction::Step(Direction::Backward))
            );
        }
    }

    #[test]
    fn digits_feed_jump_box() {
        assert_eq!(
            resolve_key(&key(KeyCode::Char('7'))),
            Some(InputAction::JumpDigit('7'))
        );
        assert_eq!(resolve_key(&key(KeyCode::Enter)), Some(InputAction::JumpSubmit));
        assert_eq!(
            resolve_key(&key(KeyCode::Backspace)),
            Some(InputAction::JumpBackspace)
        );
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_is_unbound() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(resolve_key(&ctrl_c), Some(InputAction::Quit));
        assert_eq!(resolve_key(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(resolve_key(&release), None);
    }

    #[test]
    fn help_lists_every_binding_group() {
        let keys: Vec<&str> = help_bindings().iter().map(|b| b.keys).collect();
        assert!(keys.contains(&"PgUp/PgDn"));
        assert!(keys.contains(&"q"));
    }
}
