//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its persisted JSON shape.
//! - Provide input validation used at the UI boundary before task creation.
//!
//! # Invariants
//! - `id` is immutable once assigned.
//! - `text` is stored trimmed.
//! - Records are replaced, never mutated in place, by collection operations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum task text length, in characters, after trimming.
pub const TASK_TEXT_MAX_CHARS: usize = 200;

/// Opaque task identifier.
///
/// Freshly created tasks carry a ULID string, but any string loaded from a
/// persisted slot is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One entry of the task collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Creates a pending task; `text` is trimmed but not validated.
    pub fn new(id: TaskId, text: &str, created_at: i64) -> Self {
        Self {
            id,
            text: text.trim().to_string(),
            completed: false,
            created_at,
        }
    }

    /// Returns a copy with the `completed` flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Rejection reasons for user-entered task text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTextError {
    Empty,
    TooLong { max_chars: usize, actual_chars: usize },
}

impl Display for TaskTextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Task cannot be empty"),
            Self::TooLong { max_chars, .. } => {
                write!(f, "Task cannot exceed {max_chars} characters")
            }
        }
    }
}

impl Error for TaskTextError {}

/// Validates raw input text and returns its trimmed form.
///
/// Length counts Unicode scalar values of the trimmed text.
///
/// # Errors
/// - `Empty` when nothing but whitespace was entered.
/// - `TooLong` when the trimmed text exceeds `TASK_TEXT_MAX_CHARS`.
pub fn validate_task_text(raw: &str) -> Result<String, TaskTextError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskTextError::Empty);
    }

    let actual_chars = trimmed.chars().count();
    if actual_chars > TASK_TEXT_MAX_CHARS {
        return Err(TaskTextError::TooLong {
            max_chars: TASK_TEXT_MAX_CHARS,
            actual_chars,
        });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{validate_task_text, Task, TaskId, TaskTextError, TASK_TEXT_MAX_CHARS};

    #[test]
    fn new_task_trims_text_and_starts_pending() {
        let task = Task::new(TaskId::new("t-1"), "  Buy milk \n", 1_700_000_000_000);
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.created_at, 1_700_000_000_000);
    }

    #[test]
    fn toggled_flips_only_completed() {
        let task = Task::new(TaskId::new("t-1"), "Walk dog", 42);
        let done = task.toggled();
        assert!(done.completed);
        assert_eq!(done.id, task.id);
        assert_eq!(done.text, task.text);
        assert_eq!(done.toggled(), task);
    }

    #[test]
    fn serializes_with_camel_case_created_at() {
        let task = Task::new(TaskId::new("abc"), "Buy milk", 1_700_000_000_123);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "text": "Buy milk",
                "completed": false,
                "createdAt": 1_700_000_000_123_i64,
            })
        );
    }

    #[test]
    fn deserializes_legacy_record_without_completed_flag() {
        let task: Task =
            serde_json::from_str(r#"{"id":"17000000001abc","text":"x","createdAt":5}"#).unwrap();
        assert_eq!(task.id.as_str(), "17000000001abc");
        assert!(!task.completed);
    }

    #[test]
    fn validate_rejects_blank_input() {
        assert_eq!(validate_task_text(" \t "), Err(TaskTextError::Empty));
        assert_eq!(TaskTextError::Empty.to_string(), "Task cannot be empty");
    }

    #[test]
    fn validate_counts_characters_after_trimming() {
        let at_limit = format!("  {}  ", "é".repeat(TASK_TEXT_MAX_CHARS));
        assert_eq!(
            validate_task_text(&at_limit).unwrap().chars().count(),
            TASK_TEXT_MAX_CHARS
        );

        let over = "a".repeat(TASK_TEXT_MAX_CHARS + 1);
        let err = validate_task_text(&over).unwrap_err();
        assert_eq!(
            err,
            TaskTextError::TooLong {
                max_chars: 200,
                actual_chars: 201
            }
        );
        assert_eq!(err.to_string(), "Task cannot exceed 200 characters");
    }
}
