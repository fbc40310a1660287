//! Injectable time source.

use chrono::{DateTime, Utc};

/// Time source for everything in the core that reads "now".
///
/// Scheduling, generation stamps and sync timestamps all go through this
/// trait so tests can pin the clock.
pub trait Clock: Send + Sync + 'static {
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
