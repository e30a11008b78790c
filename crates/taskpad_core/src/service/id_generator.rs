//! Task id generation.
//!
//! Ids are ULIDs: a 48-bit millisecond timestamp followed by 80 random bits.
//! The generator is monotonic within one instance, so ids drawn within the
//! same millisecond (or from a clock that stalls or steps backwards) still
//! differ and sort in creation order.

use crate::model::task::TaskId;
use log::warn;
use std::time::SystemTime;
use ulid::{Generator, Ulid};

/// Monotonic ULID source for new task ids.
pub struct TaskIdGenerator {
    inner: Generator,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    /// Draws the next id for a task created at `now`.
    pub fn next_id(&mut self, now: SystemTime) -> TaskId {
        let ulid = match self.inner.generate_from_datetime(now) {
            Ok(ulid) => ulid,
            Err(err) => {
                // Random part exhausted within one millisecond.
                warn!("event=task_id module=service status=fallback error={err}");
                Ulid::from_datetime(now)
            }
        };
        TaskId::new(ulid.to_string())
    }
}

impl Default for TaskIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
