//! Persisted state containers.
//!
//! # Responsibility
//! - Mirror one serializable value in memory and in one storage slot.
//! - Absorb every persistence failure locally; callers only ever see values.

pub mod persisted;
