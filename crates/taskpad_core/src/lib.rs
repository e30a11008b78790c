//! Core domain logic for taskpad.
//! This crate is the single source of truth for task list invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use clock::{epoch_millis, Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::task::{validate_task_text, Task, TaskId, TaskTextError, TASK_TEXT_MAX_CHARS};
pub use model::theme::Theme;
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, SlotRepository, SqliteSlotRepository,
};
pub use service::task_service::{TaskService, TASKS_SLOT_KEY};
pub use service::theme_service::{ThemeService, THEME_SLOT_KEY};
pub use store::persisted::PersistedStore;
pub use view::{filter_tasks, resolve_reorder, TaskCounts, TaskFilter};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
