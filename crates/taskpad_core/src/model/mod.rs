//! Domain model for the task list and its display preferences.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`, unique in its collection.
//! - Field names on the wire match the persisted slot format (`createdAt`).

pub mod task;
pub mod theme;
