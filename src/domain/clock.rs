//! Time source abstraction

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Operations that compare against "now" more than once read the clock a
/// single time and reuse the value.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
