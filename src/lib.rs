// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod passage;
pub mod runtime;
pub mod session;
pub mod time_series;
pub mod ui;
pub mod util;

pub use engine::{ClockStatus, MetricsEngine, SessionCallbacks};
pub use error::{KeypaceError, Result};
pub use session::{SessionPhase, SessionSnapshot, TestResult};
