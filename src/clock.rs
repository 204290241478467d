//! Fixed-length countdown that advances in whole seconds.
//!
//! The clock never sleeps or spawns anything. Callers poll it from their
//! event loop and it reports at most one due tick per poll, measured
//! against a monotonic [`TimeSource`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const TICK: Duration = Duration::from_secs(1);

/// Monotonic time, as an offset from an arbitrary fixed origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Production source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven source for tests and replays. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<Duration>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Emitted once per elapsed second while the clock runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_secs: u32,
    /// Number of ticks elapsed including this one.
    pub second: u32,
}

impl Tick {
    pub fn is_last(&self) -> bool {
        self.remaining_secs == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    started_at: Duration,
    duration_secs: u32,
    remaining_secs: u32,
    ticks: u32,
}

#[derive(Debug, Default)]
pub struct SessionClock {
    countdown: Option<Countdown>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fresh countdown, replacing any running one.
    pub fn start(&mut self, duration_secs: u32, now: Duration) {
        self.countdown = Some(Countdown {
            started_at: now,
            duration_secs,
            remaining_secs: duration_secs,
            ticks: 0,
        });
    }

    /// Disarm. Safe to call when nothing runs.
    pub fn stop(&mut self) {
        self.countdown = None;
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining_secs)
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.countdown.map(|c| c.duration_secs)
    }

    /// Ticks fired since `start`.
    pub fn ticks_elapsed(&self) -> u32 {
        self.countdown.map_or(0, |c| c.ticks)
    }

    /// Whole seconds since `start` according to `now`, whether or not the
    /// matching tick has been processed yet.
    pub fn current_second(&self, now: Duration) -> Option<u64> {
        self.countdown
            .map(|c| now.saturating_sub(c.started_at).as_secs())
    }

    /// True while no second boundary has passed since the last tick.
    pub fn in_tick_window(&self, now: Duration) -> bool {
        match self.current_second(now) {
            Some(second) => second == u64::from(self.ticks_elapsed()),
            None => false,
        }
    }

    /// Fire the next tick if its deadline has passed.
    ///
    /// Deadlines sit on the nominal schedule `start + n * TICK`, so a late
    /// poll does not push later ticks back. A tick that reaches zero
    /// disarms the clock.
    pub fn poll(&mut self, now: Duration) -> Option<Tick> {
        let countdown = self.countdown.as_mut()?;

        let deadline = countdown.started_at + TICK * (countdown.ticks + 1);
        if now < deadline {
            return None;
        }

        countdown.ticks += 1;
        countdown.remaining_secs = countdown.remaining_secs.saturating_sub(1);
        let tick = Tick {
            remaining_secs: countdown.remaining_secs,
            second: countdown.ticks,
        };

        if tick.is_last() {
            self.countdown = None;
        }

        Some(tick)
    }
}
