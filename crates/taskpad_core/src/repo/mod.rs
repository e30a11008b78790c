//! Repository layer for the key-value slot boundary.
//!
//! # Responsibility
//! - Define the slot read/write contract used by persisted stores.
//! - Isolate SQLite query details from store and service orchestration.
//!
//! # Invariants
//! - Slot keys are non-blank; repositories reject blank keys before I/O.
//! - Slot values are opaque strings; repositories never interpret them.

pub mod slot_repo;
