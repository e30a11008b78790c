//! Time source used for task timestamps and id generation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Supplies the current wall-clock time.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock frozen at one instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: SystemTime,
}

impl FixedClock {
    pub fn new(instant: SystemTime) -> Self {
        Self { instant }
    }

    pub fn at_epoch_millis(millis: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_millis(millis))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.instant
    }
}

/// Converts a wall-clock instant to Unix epoch milliseconds.
///
/// Instants before the epoch clamp to `0`.
pub fn epoch_millis(instant: SystemTime) -> i64 {
    instant
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
