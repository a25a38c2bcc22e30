// Keyboard input - crossterm events mapped to editor actions
//
// The reader runs on a blocking thread and polls with a short timeout so it
// notices shutdown promptly. Everything the session should react to is
// translated to an EditorAction here; the session never sees key codes.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::constants::INPUT_POLL_MS;
use crate::session::EditorAction;

/// Lines moved by PageUp/PageDown
const PAGE_SCROLL_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Action(EditorAction),
    /// Terminal size changed; redraw
    Resize,
    /// Leave the application
    Quit,
}

/// Translate one key press; `None` for keys without a binding
pub fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let action = match (key.code, ctrl) {
        (KeyCode::Char('c'), true) => EditorAction::Interrupt,
        (KeyCode::Char('d'), true) | (KeyCode::Char('q'), true) => return Some(InputEvent::Quit),
        (KeyCode::Char('a'), true) => EditorAction::CursorHome,
        (KeyCode::Char('e'), true) => EditorAction::CursorEnd,
        (KeyCode::Char(_), true) => return None,
        (KeyCode::Char(c), false) => EditorAction::Insert(c.to_string()),
        (KeyCode::Enter, _) => EditorAction::Submit,
        (KeyCode::Tab, _) => EditorAction::Complete,
        (KeyCode::Backspace, _) => EditorAction::Backspace,
        (KeyCode::Delete, _) => EditorAction::Delete,
        (KeyCode::Left, _) => EditorAction::CursorLeft,
        (KeyCode::Right, _) => EditorAction::CursorRight,
        (KeyCode::Home, _) => EditorAction::CursorHome,
        (KeyCode::End, _) => EditorAction::CursorEnd,
        (KeyCode::Up, _) if shift => EditorAction::ScrollUp(1),
        (KeyCode::Down, _) if shift => EditorAction::ScrollDown(1),
        (KeyCode::Up, _) => EditorAction::HistoryPrevious,
        (KeyCode::Down, _) => EditorAction::HistoryNext,
        (KeyCode::PageUp, _) => EditorAction::ScrollUp(PAGE_SCROLL_LINES),
        (KeyCode::PageDown, _) => EditorAction::ScrollDown(PAGE_SCROLL_LINES),
        _ => return None,
    };
    Some(InputEvent::Action(action))
}

pub fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        // The prompt is a single line
        Event::Paste(text) => Some(InputEvent::Action(EditorAction::Insert(
            text.replace(['\r', '\n'], " "),
        ))),
        Event::Resize(..) => Some(InputEvent::Resize),
        _ => None,
    }
}

/// Spawn the blocking reader; it stops on shutdown or when the receiver is dropped
pub fn spawn_input_task(shutdown: CancellationToken) -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        while !shutdown.is_cancelled() {
            match event::poll(Duration::from_millis(INPUT_POLL_MS)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("terminal poll failed: {}", e);
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("terminal read failed: {}", e);
                    break;
                }
            };
            if let Some(input) = map_event(event) {
                if tx.send(input).is_err() {
                    break;
                }
            }
        }
        tracing::debug!("input task stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
        map_key(KeyEvent::new(code, modifiers))
    }

    fn action(a: EditorAction) -> Option<InputEvent> {
        Some(InputEvent::Action(a))
    }

    #[test]
    fn test_printable_keys_insert() {
        assert_eq!(
            key(KeyCode::Char('x'), KeyModifiers::NONE),
            action(EditorAction::Insert("x".into()))
        );
        assert_eq!(
            key(KeyCode::Char('X'), KeyModifiers::SHIFT),
            action(EditorAction::Insert("X".into()))
        );
        assert_eq!(
            key(KeyCode::Char('ب'), KeyModifiers::NONE),
            action(EditorAction::Insert("ب".into()))
        );
    }

    #[test]
    fn test_control_bindings() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), action(EditorAction::Interrupt));
        assert_eq!(key(KeyCode::Char('d'), KeyModifiers::CONTROL), Some(InputEvent::Quit));
        assert_eq!(key(KeyCode::Char('z'), KeyModifiers::CONTROL), None);
    }

    #[test]
    fn test_navigation_and_scroll() {
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), action(EditorAction::Complete));
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), action(EditorAction::HistoryPrevious));
        assert_eq!(key(KeyCode::Up, KeyModifiers::SHIFT), action(EditorAction::ScrollUp(1)));
        assert_eq!(
            key(KeyCode::PageDown, KeyModifiers::NONE),
            action(EditorAction::ScrollDown(PAGE_SCROLL_LINES))
        );
    }

    #[test]
    fn test_paste_and_resize() {
        assert_eq!(
            map_event(Event::Paste("ls -la".into())),
            action(EditorAction::Insert("ls -la".into()))
        );
        assert_eq!(
            map_event(Event::Paste("a\nb".into())),
            action(EditorAction::Insert("a b".into()))
        );
        assert_eq!(map_event(Event::Resize(80, 24)), Some(InputEvent::Resize));
    }
}
