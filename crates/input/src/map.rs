//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to game actions.
///
/// Release events (reported by terminals with enhanced keyboard support) and
/// control chords map to nothing.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        // Movement
        KeyCode::Up
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('k')
        | KeyCode::Char('K') => Some(GameAction::MoveUp),
        KeyCode::Down
        | KeyCode::Char('s')
        | KeyCode::Char('S')
        | KeyCode::Char('j')
        | KeyCode::Char('J') => Some(GameAction::MoveDown),
        KeyCode::Left
        | KeyCode::Char('a')
        | KeyCode::Char('A')
        | KeyCode::Char('h')
        | KeyCode::Char('H') => Some(GameAction::MoveLeft),
        KeyCode::Right
        | KeyCode::Char('d')
        | KeyCode::Char('D')
        | KeyCode::Char('l')
        | KeyCode::Char('L') => Some(GameAction::MoveRight),

        // Screens
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(GameAction::Leaderboard),

        _ => None,
    }
}

/// Keys that close the leaderboard besides the `b` toggle.
pub fn is_dismiss_key(key: KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && !key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' '))
}

/// One edit of a single-line text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Submit,
}

/// Map keyboard input to text edits. Every printable key types itself,
/// including the ones bound to game actions.
pub fn handle_text_key(key: KeyEvent) -> Option<TextEdit> {
    if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(TextEdit::Insert(c)),
        KeyCode::Backspace => Some(TextEdit::Backspace),
        KeyCode::Enter => Some(TextEdit::Submit),
        _ => None,
    }
}

/// Quit keys while a text field has focus: `q` types, so only Esc and Ctrl-C quit.
pub fn should_quit_text(key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
