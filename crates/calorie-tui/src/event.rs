//! Event handling for the calorie TUI.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, keep it off the runtime
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms.max(1));
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            // Windows reports releases too
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
///
/// Keys that map to [`Action::None`] are treated as text editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Submit,
    Clear,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpToStart,
    JumpToLatest,
    HistoryPrev,
    HistoryNext,
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('l') => Action::Clear,
            KeyCode::Home => Action::JumpToStart,
            KeyCode::End => Action::JumpToLatest,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::F(1) => Action::Help,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Back,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Up => Action::HistoryPrev,
        KeyCode::Down => Action::HistoryNext,
        _ => Action::None,
    }
}

/// Convert a mouse event to an action. Only the wheel is used.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_global_keys() {
        assert_eq!(key_to_action(ctrl(KeyCode::Char('c'))), Action::Quit);
        assert_eq!(key_to_action(ctrl(KeyCode::Char('l'))), Action::Clear);
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Back);
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::PageDown);
        assert_eq!(key_to_action(ctrl(KeyCode::Home)), Action::JumpToStart);
        assert_eq!(key_to_action(ctrl(KeyCode::End)), Action::JumpToLatest);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::HistoryPrev);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::HistoryNext);
    }

    #[test]
    fn test_typing_is_not_an_action() {
        // Letters must reach the draft, including the ones bound with Ctrl.
        for c in ['q', 'c', 'l', '?', ' '] {
            assert_eq!(key_to_action(key(KeyCode::Char(c))), Action::None);
        }
        assert_eq!(key_to_action(key(KeyCode::Backspace)), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Home)), Action::None);
    }

    #[test]
    fn test_mouse_wheel() {
        assert_eq!(mouse_to_action(mouse(MouseEventKind::ScrollUp)), Action::ScrollUp);
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::ScrollDown)),
            Action::ScrollDown
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::None);
    }
}
