//! Event handling for the dashboard.
//!
//! Keyboard input is read on a dedicated thread (crossterm's reader blocks)
//! and forwarded to the async event loop over a channel. [`InputHandler`]
//! turns key presses into [`AppEvent`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// How often the reader thread checks its stop flag.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Buffer for forwarded terminal events.
const INPUT_CHANNEL_BUFFER: usize = 64;

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Toggle the audible alert
    ToggleSound,
    /// Regenerate the queue now
    Refresh,
    /// Switch to the next color theme
    CycleTheme,
    ShowHelp,
    HideHelp,
    Quit,
    /// Ctrl+C
    ForceQuit,
    /// Close the help overlay
    Cancel,
    NavigateUp,
    NavigateDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    None,
}

/// Converts key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Whether the help overlay is capturing input
    help_visible: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_help_visible(&mut self, visible: bool) {
        self.help_visible = visible;
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        // Windows reports releases too
        if key.kind == KeyEventKind::Release {
            return AppEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            return AppEvent::Refresh;
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
                _ => AppEvent::HideHelp,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
            KeyCode::Esc => AppEvent::Cancel,
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => AppEvent::ShowHelp,

            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('m') | KeyCode::Char('M') => {
                AppEvent::ToggleSound
            }
            KeyCode::Char('r') | KeyCode::Char('R') => AppEvent::Refresh,
            KeyCode::Char('t') | KeyCode::Char('T') => AppEvent::CycleTheme,

            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::PageUp => AppEvent::PageUp,
            KeyCode::PageDown => AppEvent::PageDown,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            _ => AppEvent::None,
        }
    }
}

/// Background thread forwarding terminal events into a channel.
///
/// Dropping the reader stops the thread within one poll interval.
pub struct InputReader {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputReader {
    /// Start the reader thread.
    pub fn spawn() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_BUFFER);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("desk-input".into())
            .spawn(move || read_events(tx, thread_stop))
            .map_err(|e| warn!(error = %e, "failed to spawn input thread"))
            .ok();

        (Self { stop, thread }, rx)
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn read_events(tx: mpsc::Sender<Event>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(INPUT_POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "terminal read failed");
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "terminal poll failed");
                break;
            }
        }
    }
    debug!("input reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_action_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('s'))), AppEvent::ToggleSound);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('m'))), AppEvent::ToggleSound);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('r'))), AppEvent::Refresh);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('t'))), AppEvent::CycleTheme);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), AppEvent::ShowHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::Cancel);
    }

    #[test]
    fn test_navigation_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageDown)), AppEvent::PageDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('g'))), AppEvent::GoToTop);
        assert_eq!(handler.handle_key(key_event(KeyCode::End)), AppEvent::GoToBottom);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('x'))), AppEvent::None);
    }

    #[test]
    fn test_control_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
        assert_eq!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            AppEvent::Refresh
        );
    }

    #[test]
    fn test_help_captures_keys() {
        let mut handler = InputHandler::new();
        handler.set_help_visible(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('s'))), AppEvent::HideHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), AppEvent::HideHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
        assert_eq!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
    }

    #[test]
    fn test_key_release_ignored() {
        let mut handler = InputHandler::new();
        let mut key = key_event(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(handler.handle_key(key), AppEvent::None);
    }
}
