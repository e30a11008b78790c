//! Filtered projections of the task collection for display.
//!
//! # Responsibility
//! - Select tasks by completion status.
//! - Count tasks per status for filter badges and footers.
//! - Translate positions in a filtered view into positions in the full
//!   collection before a reorder reaches `TaskService`.

use crate::model::task::Task;

/// Status filter applied to the visible task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Per-status totals over the full collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            all: tasks.len(),
            pending: tasks.len() - completed,
            completed,
        }
    }

    /// Count shown next to one filter.
    pub fn for_filter(&self, filter: TaskFilter) -> usize {
        match filter {
            TaskFilter::All => self.all,
            TaskFilter::Pending => self.pending,
            TaskFilter::Completed => self.completed,
        }
    }
}

/// Returns the tasks visible under `filter`, in collection order.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Maps a drag from `source` to `destination` within the `filter` view onto
/// full-collection indices for `TaskService::reorder_tasks`.
///
/// The task landing at `destination` in the view determines the target slot,
/// so hidden tasks between the two keep their relative positions.
///
/// Returns `None` for a drop on the same position or outside the view.
pub fn resolve_reorder(
    tasks: &[Task],
    filter: TaskFilter,
    source: usize,
    destination: usize,
) -> Option<(usize, usize)> {
    if source == destination {
        return None;
    }

    let visible = filter_tasks(tasks, filter);
    let source_task = *visible.get(source)?;
    let destination_task = *visible.get(destination)?;

    let position_of = |wanted: &Task| tasks.iter().position(|task| task.id == wanted.id);
    Some((position_of(source_task)?, position_of(destination_task)?))
}
