//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list and theme use-cases to Dart via FRB.
//! - Validate user input and translate filtered-view indices before they
//!   reach core services.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens its own connection and reloads slots, so the UI
//!   always renders the latest committed state.
//! - Storage access fails with an error envelope until a database path is
//!   configured via `init_storage` or `TASKPAD_DB_PATH`.
//! - A slot that cannot be read fails the call; nothing is written over it.

use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use taskpad_core::db::{open_db, Connection};
use taskpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve_reorder, validate_task_text, SqliteSlotRepository, Task, TaskCounts, TaskFilter,
    TaskService, Theme, ThemeService,
};

const DB_PATH_ENV: &str = "TASKPAD_DB_PATH";
static STORAGE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Configures the SQLite file that backs task and theme slots.
///
/// # FFI contract
/// - Must be called before any task/theme API unless `TASKPAD_DB_PATH` is set.
/// - The database is opened and migrated first; a path that cannot be opened
///   is reported and not remembered, so a later call may fix it.
/// - Repeating the call with the same path is a no-op; a different path is
///   rejected for the rest of the process.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }

    let requested = PathBuf::from(trimmed);
    if let Err(err) = open_db(&requested) {
        warn!("event=ffi_storage module=ffi status=error error_code=db_open_failed error={err}");
        return format!("storage open failed: {err}");
    }

    let active = STORAGE_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "storage already initialized at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// One task row for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID.
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
}

/// Per-status totals shown on filter buttons and the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCountsView {
    pub all: u32,
    pub pending: u32,
    pub completed: u32,
}

/// Response envelope for task list reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the list could be loaded.
    pub ok: bool,
    /// Tasks visible under the applied filter, in display order.
    pub items: Vec<TaskItem>,
    /// Counts over the full collection, independent of the filter.
    pub counts: TaskCountsView,
    /// Effective filter name (`all|pending|completed`).
    pub applied_filter: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the request was accepted.
    pub ok: bool,
    /// Whether the collection changed (misses and no-op moves report false).
    pub changed: bool,
    /// Created task ID, only for `task_add`.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn applied(changed: bool, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed,
            task_id: None,
            message: message.into(),
        }
    }

    fn created(task_id: String) -> Self {
        Self {
            ok: true,
            changed: true,
            task_id: Some(task_id),
            message: "Task added.".to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Response envelope for theme reads and toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeResponse {
    pub ok: bool,
    /// `light` or `dark`; `light` when the call failed.
    pub theme: String,
    pub message: String,
}

/// Lists tasks under a status filter.
///
/// Unknown filter names fall back to `all`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(filter: String) -> TaskListResponse {
    tasks_list_at(&resolve_storage_path(), &filter)
}

fn tasks_list_at(location: &StorageLocation, filter: &str) -> TaskListResponse {
    let filter = normalize_filter(filter);
    match with_task_service(location, |service| snapshot(service.tasks(), filter)) {
        Ok((items, counts)) => TaskListResponse {
            ok: true,
            message: if items.is_empty() {
                empty_list_message(filter).to_string()
            } else {
                format!("{} task(s).", items.len())
            },
            items,
            counts,
            applied_filter: filter.as_str().to_string(),
        },
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            counts: TaskCountsView {
                all: 0,
                pending: 0,
                completed: 0,
            },
            applied_filter: filter.as_str().to_string(),
            message: format!("tasks_list failed: {err}"),
        },
    }
}

/// Adds a task from the entry form.
///
/// # FFI contract
/// - Rejects blank text and text over 200 characters with `ok=false` and a
///   user-facing message.
/// - Returns the created task ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(text: String) -> TaskActionResponse {
    task_add_at(&resolve_storage_path(), &text)
}

fn task_add_at(location: &StorageLocation, text: &str) -> TaskActionResponse {
    let text = match validate_task_text(text) {
        Ok(text) => text,
        Err(err) => return TaskActionResponse::failure(err.to_string()),
    };

    match with_task_service(location, |service| service.add_task(&text)) {
        Ok(task_id) => TaskActionResponse::created(task_id.to_string()),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Flips the completed flag of one task.
///
/// An unknown ID is accepted as a no-op (`ok=true`, `changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(task_id: String) -> TaskActionResponse {
    task_toggle_at(&resolve_storage_path(), &task_id)
}

fn task_toggle_at(location: &StorageLocation, task_id: &str) -> TaskActionResponse {
    match with_task_service(location, |service| service.toggle_task(task_id.trim())) {
        Ok(true) => TaskActionResponse::applied(true, "Task updated."),
        Ok(false) => TaskActionResponse::applied(false, "Task not found."),
        Err(err) => TaskActionResponse::failure(format!("task_toggle failed: {err}")),
    }
}

/// Deletes one task.
///
/// An unknown ID is accepted as a no-op (`ok=true`, `changed=false`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    task_delete_at(&resolve_storage_path(), &task_id)
}

fn task_delete_at(location: &StorageLocation, task_id: &str) -> TaskActionResponse {
    match with_task_service(location, |service| service.delete_task(task_id.trim())) {
        Ok(true) => TaskActionResponse::applied(true, "Task deleted."),
        Ok(false) => TaskActionResponse::applied(false, "Task not found."),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Applies a drag-and-drop move made in the list rendered under `filter`.
///
/// `source_index` and `destination_index` are positions in that filtered
/// list; they are translated to full-collection positions here.
#[flutter_rust_bridge::frb(sync)]
pub fn task_reorder(
    filter: String,
    source_index: u32,
    destination_index: u32,
) -> TaskActionResponse {
    task_reorder_at(
        &resolve_storage_path(),
        &filter,
        source_index,
        destination_index,
    )
}

fn task_reorder_at(
    location: &StorageLocation,
    filter: &str,
    source_index: u32,
    destination_index: u32,
) -> TaskActionResponse {
    let filter = normalize_filter(filter);
    let (Ok(source), Ok(destination)) = (
        usize::try_from(source_index),
        usize::try_from(destination_index),
    ) else {
        return TaskActionResponse::failure("task_reorder failed: index out of range");
    };

    let result = with_task_service(location, |service| {
        let target = resolve_reorder(service.tasks(), filter, source, destination);
        target.is_some_and(|(start, end)| service.reorder_tasks(start, end))
    });
    match result {
        Ok(true) => TaskActionResponse::applied(true, "Task moved."),
        Ok(false) => TaskActionResponse::applied(false, "Nothing to move."),
        Err(err) => TaskActionResponse::failure(format!("task_reorder failed: {err}")),
    }
}

/// Returns the stored theme preference.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_get() -> ThemeResponse {
    theme_get_at(&resolve_storage_path())
}

fn theme_get_at(location: &StorageLocation) -> ThemeResponse {
    theme_response(
        with_theme_service(location, |service| service.theme()),
        "theme_get",
    )
}

/// Switches between light and dark and returns the new theme.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_toggle() -> ThemeResponse {
    theme_toggle_at(&resolve_storage_path())
}

fn theme_toggle_at(location: &StorageLocation) -> ThemeResponse {
    theme_response(
        with_theme_service(location, |service| service.toggle_theme()),
        "theme_toggle",
    )
}

/// Stores an explicit theme choice (`light|dark`, case-insensitive).
///
/// Unknown names are rejected with `ok=false` and leave the stored theme
/// unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_set(theme: String) -> ThemeResponse {
    theme_set_at(&resolve_storage_path(), &theme)
}

fn theme_set_at(location: &StorageLocation, raw: &str) -> ThemeResponse {
    let Some(theme) = Theme::parse(raw) else {
        return theme_response(
            Err(format!("unsupported theme `{}`", raw.trim())),
            "theme_set",
        );
    };
    theme_response(
        with_theme_service(location, |service| {
            service.set_theme(theme);
            theme
        }),
        "theme_set",
    )
}

fn theme_response(result: Result<Theme, String>, operation: &str) -> ThemeResponse {
    match result {
        Ok(theme) => ThemeResponse {
            ok: true,
            theme: theme.as_str().to_string(),
            message: String::new(),
        },
        Err(err) => ThemeResponse {
            ok: false,
            theme: Theme::default().as_str().to_string(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn normalize_filter(raw: &str) -> TaskFilter {
    TaskFilter::parse(raw).unwrap_or_else(|| {
        warn!("event=ffi_filter module=ffi status=fallback filter=all");
        TaskFilter::All
    })
}

fn empty_list_message(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "No tasks yet. Add one above!",
        TaskFilter::Pending => "No pending tasks. Great job!",
        TaskFilter::Completed => "No completed tasks.",
    }
}

fn snapshot(tasks: &[Task], filter: TaskFilter) -> (Vec<TaskItem>, TaskCountsView) {
    let counts = TaskCounts::from_tasks(tasks);
    let mut items = Vec::with_capacity(counts.for_filter(filter));
    items.extend(
        tasks
            .iter()
            .filter(|task| filter.matches(task))
            .map(to_task_item),
    );
    (items, to_counts_view(counts))
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        text: task.text.clone(),
        completed: task.completed,
        created_at_ms: task.created_at,
    }
}

fn to_counts_view(counts: TaskCounts) -> TaskCountsView {
    let clamp = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
    TaskCountsView {
        all: clamp(counts.all),
        pending: clamp(counts.pending),
        completed: clamp(counts.completed),
    }
}

/// Database file for one call, or why none is configured.
type StorageLocation = Result<PathBuf, String>;

fn resolve_storage_path() -> StorageLocation {
    let env_value = std::env::var(DB_PATH_ENV).ok();
    storage_path_from(
        STORAGE_PATH.get().map(PathBuf::as_path),
        env_value.as_deref(),
    )
}

fn storage_path_from(configured: Option<&Path>, env_value: Option<&str>) -> StorageLocation {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    match env_value.map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(PathBuf::from(raw)),
        _ => Err(format!(
            "storage not initialized; call init_storage or set {DB_PATH_ENV}"
        )),
    }
}

fn open_location(location: &StorageLocation) -> Result<Connection, String> {
    let db_path = location.as_ref().map_err(String::clone)?;
    open_db(db_path).map_err(|err| format!("storage open failed: {err}"))
}

fn with_task_service<T>(
    location: &StorageLocation,
    f: impl FnOnce(&mut TaskService<SqliteSlotRepository<'_>>) -> T,
) -> Result<T, String> {
    let conn = open_location(location)?;
    let mut service = TaskService::open(SqliteSlotRepository::new(&conn));
    if service.load_failed() {
        return Err("stored tasks could not be read; refusing to touch them".to_string());
    }
    Ok(f(&mut service))
}

fn with_theme_service<T>(
    location: &StorageLocation,
    f: impl FnOnce(&mut ThemeService<SqliteSlotRepository<'_>>) -> T,
) -> Result<T, String> {
    let conn = open_location(location)?;
    let mut service = ThemeService::open(SqliteSlotRepository::new(&conn));
    if service.load_failed() {
        return Err("stored theme could not be read; refusing to touch it".to_string());
    }
    Ok(f(&mut service))
}
