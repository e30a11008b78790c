//! Task collection use-case service.
//!
//! # Responsibility
//! - Own the ordered task collection for one session.
//! - Apply add/toggle/delete/reorder and write each result through the
//!   `tasks` slot.
//!
//! # Invariants
//! - Collection order is display order and persisted order.
//! - Task ids are unique within the collection.
//! - Every change replaces the collection with a new value; no-ops write
//!   nothing and leave `revision()` untouched.
//! - Input text is trimmed but never validated here.
//! - Indices passed to `reorder_tasks` address the full collection; view
//!   translation happens in `crate::view` before the call.

use crate::clock::{epoch_millis, Clock, SystemClock};
use crate::model::task::{Task, TaskId};
use crate::repo::slot_repo::SlotRepository;
use crate::service::id_generator::TaskIdGenerator;
use crate::store::persisted::PersistedStore;
use log::{debug, warn};
use std::time::SystemTime;

/// Slot key holding the serialized task collection.
pub const TASKS_SLOT_KEY: &str = "tasks";

/// Session owner of the task collection.
pub struct TaskService<R: SlotRepository, C: Clock = SystemClock> {
    store: PersistedStore<Vec<Task>, R>,
    ids: TaskIdGenerator,
    clock: C,
}

impl<R: SlotRepository> TaskService<R> {
    /// Loads the collection from `repo` using the system clock.
    pub fn open(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: SlotRepository, C: Clock> TaskService<R, C> {
    /// Loads the collection from `repo` with an explicit time source.
    pub fn with_clock(repo: R, clock: C) -> Self {
        let store = PersistedStore::open(repo, TASKS_SLOT_KEY, Vec::new());
        debug!(
            "event=tasks_open module=service status=ok task_count={}",
            store.get().len()
        );
        Self {
            store,
            ids: TaskIdGenerator::new(),
            clock,
        }
    }

    /// Current collection in display order.
    pub fn tasks(&self) -> &[Task] {
        self.store.get()
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|task| task.id.as_str() == id)
    }

    /// Number of committed changes since this service was opened.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Whether the stored collection could not be read on open.
    ///
    /// Changes made afterwards stay in memory and are never written back.
    pub fn load_failed(&self) -> bool {
        self.store.load_failed()
    }

    /// Appends a new pending task and returns its id.
    ///
    /// # Contract
    /// - `text` is expected to be validated by the caller
    ///   (see `validate_task_text`); it is only trimmed here.
    /// - Duplicate text is allowed.
    pub fn add_task(&mut self, text: &str) -> TaskId {
        let now = self.clock.now();
        let id = self.next_unique_id(now);
        let task = Task::new(id.clone(), text, epoch_millis(now));

        let count = self
            .store
            .update(move |current| {
                let mut next = Vec::with_capacity(current.len() + 1);
                next.extend_from_slice(current);
                next.push(task);
                next
            })
            .len();
        debug!("event=task_add module=service status=ok task_count={count}");
        id
    }

    /// Flips `completed` on the task with `id`.
    ///
    /// Returns `false` and leaves the collection untouched when no task matches.
    pub fn toggle_task(&mut self, id: &str) -> bool {
        if self.find_task(id).is_none() {
            debug!("event=task_toggle module=service status=miss");
            return false;
        }

        self.store.update(|current| {
            current
                .iter()
                .map(|task| {
                    if task.id.as_str() == id {
                        task.toggled()
                    } else {
                        task.clone()
                    }
                })
                .collect()
        });
        debug!("event=task_toggle module=service status=ok");
        true
    }

    /// Removes the task with `id`, keeping the order of the rest.
    ///
    /// Returns `false` when no task matches.
    pub fn delete_task(&mut self, id: &str) -> bool {
        if self.find_task(id).is_none() {
            debug!("event=task_delete module=service status=miss");
            return false;
        }

        let count = self
            .store
            .update(|current| {
                current
                    .iter()
                    .filter(|task| task.id.as_str() != id)
                    .cloned()
                    .collect()
            })
            .len();
        debug!("event=task_delete module=service status=ok task_count={count}");
        true
    }

    /// Moves the task at `start_index` so it ends up at `end_index`.
    ///
    /// This is a single-element move, not a swap. Returns `false` without
    /// writing when the indices are equal or either one is outside
    /// `0..len`.
    pub fn reorder_tasks(&mut self, start_index: usize, end_index: usize) -> bool {
        let len = self.tasks().len();
        if start_index >= len || end_index >= len {
            warn!(
                "event=task_reorder module=service status=rejected start={start_index} end={end_index} task_count={len}"
            );
            return false;
        }
        if start_index == end_index {
            return false;
        }

        self.store.update(|current| {
            let mut next = current.clone();
            let moved = next.remove(start_index);
            next.insert(end_index, moved);
            next
        });
        debug!(
            "event=task_reorder module=service status=ok start={start_index} end={end_index}"
        );
        true
    }

    fn next_unique_id(&mut self, now: SystemTime) -> TaskId {
        loop {
            let candidate = self.ids.next_id(now);
            if self.find_task(candidate.as_str()).is_none() {
                return candidate;
            }
            warn!("event=task_id module=service status=collision");
        }
    }
}
