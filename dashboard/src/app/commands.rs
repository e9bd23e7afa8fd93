use super::event::{AppEvent, UiEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hbdm::Direction;

/// Terminal key -> UI intent. Keys with no binding map to `None`.
pub fn map_key(key: KeyEvent) -> Option<UiEvent> {
    // release/repeat events arrive on some platforms; only presses count
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    let ev = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => UiEvent::Quit,
        KeyCode::Tab => UiEvent::FocusNext,
        KeyCode::BackTab => UiEvent::FocusPrev,
        KeyCode::Backspace => UiEvent::Backspace,
        KeyCode::Char('b') => UiEvent::SubmitOrder { direction: Direction::Buy },
        KeyCode::Char('s') => UiEvent::SubmitOrder { direction: Direction::Sell },
        KeyCode::Char('r') => UiEvent::RefreshNow,
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => UiEvent::Input(c),
        _ => return None,
    };
    Some(ev)
}

pub fn key_event(key: KeyEvent) -> Option<AppEvent> {
    map_key(key).map(AppEvent::Ui)
}
