//! Screen state and key handling for the terminal front end, kept free of
//! any terminal I/O so it can be driven headlessly.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::clock::{MonotonicTime, TimeSource};
use crate::engine::{ClockStatus, MetricsEngine, SessionCallbacks};
use crate::history::{HistoryStore, PersonalBests};
use crate::passage::PassageProvider;
use crate::session::TestResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// History snapshot shown on the reports screen.
#[derive(Debug, Clone, Default)]
pub struct Reports {
    pub history: Vec<TestResult>,
    pub bests: PersonalBests,
    pub error: Option<String>,
}

pub struct App<T: TimeSource = MonotonicTime> {
    pub engine: MetricsEngine<T>,
    pub screen: Screen,
    pub duration_secs: u32,
    /// Text for the current (or next) test.
    pub passage: String,
    /// What the user has typed so far.
    pub buffer: String,
    pub last_result: Option<TestResult>,
    pub reports: Reports,
    /// Screen to return to when leaving reports.
    previous: Screen,
    provider: Box<dyn PassageProvider>,
    history: Option<Box<dyn HistoryStore>>,
}

impl<T: TimeSource> App<T> {
    pub fn new(
        engine: MetricsEngine<T>,
        duration_secs: u32,
        provider: Box<dyn PassageProvider>,
        history: Option<Box<dyn HistoryStore>>,
    ) -> Self {
        let passage = provider.passage(duration_secs);
        Self {
            engine,
            screen: Screen::Typing,
            duration_secs,
            passage,
            buffer: String::new(),
            last_result: None,
            reports: Reports::default(),
            previous: Screen::Typing,
            provider,
            history,
        }
    }

    pub fn has_started(&self) -> bool {
        self.engine.is_running()
    }

    /// Seconds shown on the timer; the full length before the first key.
    pub fn remaining_secs(&self) -> u32 {
        self.engine.remaining_secs().unwrap_or(self.duration_secs)
    }

    /// Abort anything in flight and prepare a fresh passage.
    pub fn new_test(&mut self) {
        self.engine.stop();
        self.passage = self.provider.passage(self.duration_secs);
        self.buffer.clear();
        self.screen = Screen::Typing;
    }

    pub fn open_reports(&mut self) {
        self.reports = match self.history.as_ref() {
            None => Reports {
                error: Some("history is unavailable".to_string()),
                ..Reports::default()
            },
            Some(store) => match (store.history(), store.personal_bests()) {
                (Ok(history), Ok(bests)) => Reports {
                    history,
                    bests,
                    error: None,
                },
                (Err(err), _) | (_, Err(err)) => {
                    warn!(%err, "could not load history");
                    Reports {
                        error: Some(err.to_string()),
                        ..Reports::default()
                    }
                }
            },
        };
        if self.screen != Screen::Reports {
            self.previous = self.screen;
        }
        self.screen = Screen::Reports;
    }

    fn close_reports(&mut self) {
        self.screen = self.previous;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.engine.stop();
            return KeyOutcome::Quit;
        }

        match self.screen {
            Screen::Typing => self.on_typing_key(key),
            Screen::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Char('n') | KeyCode::Enter => self.new_test(),
                KeyCode::Char('h') => self.open_reports(),
                _ => {}
            },
            Screen::Reports => match key.code {
                KeyCode::Char('b') | KeyCode::Backspace => self.close_reports(),
                KeyCode::Char('r') | KeyCode::Char('n') => self.new_test(),
                _ => {}
            },
        }

        KeyOutcome::Continue
    }

    fn on_typing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.new_test(),
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    self.engine.record_input(&self.buffer);
                }
            }
            KeyCode::Char(c) => {
                if !self.engine.is_running() {
                    // Reports can only be opened before the clock starts.
                    if c == '?' && self.buffer.is_empty() {
                        self.open_reports();
                        return;
                    }
                    self.engine.start(
                        self.duration_secs,
                        self.passage.clone(),
                        SessionCallbacks::new(),
                    );
                }
                self.buffer.push(c);
                self.engine.record_input(&self.buffer);
            }
            _ => {}
        }
    }

    /// Advance the session clock; returns true when the screen changed.
    pub fn on_poll(&mut self) -> bool {
        match self.engine.poll() {
            ClockStatus::Idle | ClockStatus::Waiting => false,
            ClockStatus::Ticked(_) => true,
            ClockStatus::Completed(result) => {
                self.finish(result);
                true
            }
        }
    }

    fn finish(&mut self, result: TestResult) {
        if let Some(store) = self.history.as_mut() {
            if let Err(err) = store.save(&result) {
                warn!(%err, test_id = result.test_id, "failed to save result");
            }
        }
        self.last_result = Some(result);
        self.buffer.clear();
        self.screen = Screen::Results;
    }
}
