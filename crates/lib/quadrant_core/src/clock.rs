//! Injectable wall-clock source.
//!
//! All issuance and expiry arithmetic flows through [`Clock`] so that tests
//! can pin or advance time (see [`crate::testutil::ManualClock`]).

use chrono::Utc;

/// Source of the current time as unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
