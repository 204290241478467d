use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// How often the UI loop wakes up to poll the session clock.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the UI loop reacts to.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the poll interval.
    Poll,
}

/// Source of terminal events.
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct TerminalEvents {
    rx: Receiver<AppEvent>,
}

impl TerminalEvents {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses edit the buffer.
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(AppEvent::Key(key))
                }
                Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for TerminalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TerminalEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless tests.
pub struct ChannelEvents {
    rx: Receiver<AppEvent>,
}

impl ChannelEvents {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Turns an event source into a stream that never blocks longer than the
/// poll interval.
pub struct Runner<E: EventSource> {
    events: E,
    interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, interval: Duration) -> Self {
        Self { events, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Next event, or `Poll` once the interval passes quietly.
    pub fn step(&self) -> AppEvent {
        match self.events.recv_timeout(self.interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Poll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn step_yields_poll_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(1));

        assert_matches!(runner.step(), AppEvent::Poll);
    }

    #[test]
    fn step_passes_events_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(10));

        assert_matches!(runner.step(), AppEvent::Resize);
    }

    #[test]
    fn disconnected_source_keeps_polling() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(ChannelEvents::new(rx), POLL_INTERVAL);

        assert_matches!(runner.step(), AppEvent::Poll);
        assert_eq!(runner.interval(), POLL_INTERVAL);
    }
}
