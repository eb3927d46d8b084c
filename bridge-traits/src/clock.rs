//! Wall-clock abstraction.
//!
//! The scheduling side of the engine works exclusively in seconds since
//! local midnight. Injecting the clock keeps the reconciliation logic
//! deterministic under test.

use chrono::{Local, NaiveTime, Timelike};
use std::sync::atomic::{AtomicU32, Ordering};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Time source trait
///
/// Abstracts local wall-clock time so controller and resolver behavior can be
/// pinned in tests.
pub trait Clock: Send + Sync {
    /// Get the current local time of day
    fn time_of_day(&self) -> NaiveTime;

    /// Get seconds elapsed since local midnight
    fn seconds_since_midnight(&self) -> u32 {
        self.time_of_day().num_seconds_from_midnight()
    }
}

/// System clock implementation using the host's local time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Settable clock for deterministic tests and demos.
///
/// Holds a fixed seconds-since-midnight value that tests advance explicitly.
/// Values wrap at midnight.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU32,
}

impl ManualClock {
    pub fn new(seconds_since_midnight: u32) -> Self {
        Self {
            seconds: AtomicU32::new(seconds_since_midnight % SECONDS_PER_DAY),
        }
    }

    /// Move the clock to an absolute time of day.
    pub fn set(&self, seconds_since_midnight: u32) {
        self.seconds
            .store(seconds_since_midnight % SECONDS_PER_DAY, Ordering::SeqCst);
    }

    /// Advance the clock by a number of seconds.
    pub fn advance(&self, seconds: u32) {
        let now = self.seconds.load(Ordering::SeqCst);
        self.seconds
            .store((now + seconds) % SECONDS_PER_DAY, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn time_of_day(&self) -> NaiveTime {
        let secs = self.seconds.load(Ordering::SeqCst) % SECONDS_PER_DAY;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
    }
}
