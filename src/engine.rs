//! Owns the running test: counts characters per second, samples speed on
//! every clock tick and scores the session once the countdown runs out.

use tracing::{debug, info};

use crate::clock::{MonotonicTime, SessionClock, Tick, TimeSource};
use crate::metrics::{self, gross_wpm};
use crate::session::{Session, SessionPhase, SessionSnapshot, TestResult};
use crate::util::round_to_tenth;

type TickFn = Box<dyn FnMut(u32)>;
type CompleteFn = Box<dyn FnMut(&TestResult)>;

/// Hooks invoked by the engine. Unset hooks do nothing.
#[derive(Default)]
pub struct SessionCallbacks {
    on_tick: Option<TickFn>,
    on_complete: Option<CompleteFn>,
}

impl SessionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the seconds left: once on start, then after every tick.
    pub fn on_tick(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }

    /// Called once with the final result when the countdown reaches zero.
    pub fn on_complete(mut self, f: impl FnMut(&TestResult) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    fn tick(&mut self, remaining_secs: u32) {
        if let Some(f) = self.on_tick.as_mut() {
            f(remaining_secs);
        }
    }

    fn complete(&mut self, result: &TestResult) {
        if let Some(f) = self.on_complete.as_mut() {
            f(result);
        }
    }
}

impl std::fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field("on_tick", &self.on_tick.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// What a call to [`MetricsEngine::poll`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockStatus {
    /// No session is running.
    Idle,
    /// Running, next second not reached yet.
    Waiting,
    /// A second elapsed; carries the seconds left.
    Ticked(u32),
    /// The last second elapsed and the session was scored.
    Completed(TestResult),
}

#[derive(Debug)]
pub struct MetricsEngine<T: TimeSource = MonotonicTime> {
    time: T,
    clock: SessionClock,
    session: Option<Session>,
    callbacks: SessionCallbacks,
    phase: SessionPhase,
    last_result: Option<TestResult>,
}

impl MetricsEngine<MonotonicTime> {
    pub fn new() -> Self {
        Self::with_time_source(MonotonicTime::new())
    }
}

impl Default for MetricsEngine<MonotonicTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> MetricsEngine<T> {
    pub fn with_time_source(time: T) -> Self {
        Self {
            time,
            clock: SessionClock::new(),
            session: None,
            callbacks: SessionCallbacks::default(),
            phase: SessionPhase::Idle,
            last_result: None,
        }
    }

    /// Begin a new test, abandoning any one still running.
    ///
    /// `on_tick` fires immediately with the full duration.
    pub fn start(
        &mut self,
        duration_secs: u32,
        passage: impl Into<String>,
        callbacks: SessionCallbacks,
    ) {
        self.stop();

        let session = Session::new(duration_secs, passage.into());
        info!(
            duration_secs,
            passage_chars = session.passage.chars().count(),
            "session started"
        );

        self.clock.start(duration_secs, self.time.now());
        self.session = Some(session);
        self.callbacks = callbacks;
        self.phase = SessionPhase::Running;
        self.callbacks.tick(duration_secs);
    }

    /// Abort the running test without scoring it. No-op when idle.
    pub fn stop(&mut self) {
        if self.clock.is_running() {
            debug!(
                remaining_secs = ?self.clock.remaining_secs(),
                "session aborted"
            );
        }
        self.clock.stop();
        if self.phase == SessionPhase::Running {
            self.session = None;
            self.phase = SessionPhase::Idle;
        }
    }

    /// Replace the typed text with `value`.
    ///
    /// Growth is credited to the current one-second window only if no second
    /// boundary has passed since the last tick; shrinking credits nothing.
    pub fn record_input(&mut self, value: &str) {
        if self.phase != SessionPhase::Running {
            return;
        }
        let in_window = self.clock.in_tick_window(self.time.now());
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let grown = session.replace_input(value);
        if grown > 0 && in_window {
            session.chars_this_second += grown;
        }
    }

    /// Advance the clock. Call this often (well under once a second).
    pub fn poll(&mut self) -> ClockStatus {
        if self.phase != SessionPhase::Running {
            return ClockStatus::Idle;
        }
        match self.clock.poll(self.time.now()) {
            None => ClockStatus::Waiting,
            Some(tick) => self.on_tick(tick),
        }
    }

    fn on_tick(&mut self, tick: Tick) -> ClockStatus {
        let Some(session) = self.session.as_mut() else {
            return ClockStatus::Idle;
        };

        let sample = session.close_second(tick.remaining_secs);
        debug!(second = tick.second, sample, "tick");

        self.callbacks.tick(tick.remaining_secs);

        if tick.is_last() {
            self.clock.stop();
            return match self.finalize() {
                Some(result) => ClockStatus::Completed(result),
                None => ClockStatus::Idle,
            };
        }

        ClockStatus::Ticked(tick.remaining_secs)
    }

    fn finalize(&mut self) -> Option<TestResult> {
        let session = self.session.take()?;

        let scores = metrics::score(
            &session.passage,
            &session.input,
            session.duration_secs,
            &session.wpm_data,
        );
        let result = session.into_result(scores);

        info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            consistency = result.consistency,
            characters_typed = result.characters_typed,
            "session finished"
        );

        self.phase = SessionPhase::Finished;
        self.callbacks.complete(&result);
        self.last_result = Some(result.clone());

        Some(result)
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_state(&self) -> SessionSnapshot {
        self.session
            .as_ref()
            .map(Session::snapshot)
            .unwrap_or_default()
    }

    pub fn passage(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.passage.as_str())
    }

    pub fn input(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.input.as_str())
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.remaining_secs)
    }

    pub fn chars_this_second(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.chars_this_second)
    }

    pub fn wpm_data(&self) -> &[f64] {
        self.session
            .as_ref()
            .map(|s| s.wpm_data.as_slice())
            .unwrap_or(&[])
    }

    /// Gross WPM over the whole seconds elapsed so far, for live display.
    pub fn live_wpm(&self) -> f64 {
        let elapsed = self.clock.ticks_elapsed();
        self.session
            .as_ref()
            .map_or(0.0, |s| round_to_tenth(gross_wpm(s.input_len(), elapsed)))
    }

    pub fn last_result(&self) -> Option<&TestResult> {
        self.last_result.as_ref()
    }
}
