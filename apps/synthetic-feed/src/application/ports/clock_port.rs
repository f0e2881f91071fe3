//! Clock Port (Driven Port)
//!
//! Wall-clock source for tick timestamps and the periodic price function.

use chrono::{DateTime, Utc};

/// Port for reading the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
