use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;
use tracing::warn;

/// Terminal events read on a blocking thread and delivered over a channel
///
/// Frame ticks are not produced here; the run loop drives those from its
/// own interval so rendering never waits on input.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    stop: Arc<AtomicBool>,
}

impl EventHandler {
    /// Start the reader; `poll_ms` bounds how long shutdown can take
    pub fn new(poll_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let poll = Duration::from_millis(poll_ms.max(1));

        let reader_stop = Arc::clone(&stop);
        tokio::task::spawn_blocking(move || {
            while !reader_stop.load(Ordering::Relaxed) {
                let event = match event::poll(poll) {
                    Ok(true) => match event::read() {
                        Ok(event) => event,
                        Err(e) => {
                            warn!(error = %e, "Terminal read failed");
                            break;
                        }
                    },
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(error = %e, "Terminal poll failed");
                        break;
                    }
                };
                if let Some(app_event) = translate(event) {
                    if tx.send(app_event).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx, stop }
    }

    /// Next event; `None` once the reader has stopped
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
}

fn translate(event: Event) -> Option<AppEvent> {
    match event {
        // Only handle key press events, ignore release events
        // (crossterm 0.27+ sends release events on some systems)
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_only_presses_and_resizes_pass() {
        let press = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(translate(Event::Key(press)), Some(AppEvent::Key(press)));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };
        assert_eq!(translate(Event::Key(release)), None);
        assert_eq!(translate(Event::Resize(80, 24)), Some(AppEvent::Resize(80, 24)));
        assert_eq!(translate(Event::FocusGained), None);
    }
}
