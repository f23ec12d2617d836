//! Observable controller state.
//!
//! Snapshots of `TaskListState` are what rendering layers receive; they never
//! mutate it directly.

use std::fmt;
use std::str::FromStr;

use tasklist_services::{Task, TaskId};

/// View filter over the task snapshot. Never changes the snapshot itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Active,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.done,
            TaskFilter::Active => !task.done,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Active => "active",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "done" | "completed" => Ok(TaskFilter::Completed),
            "active" | "open" | "todo" => Ok(TaskFilter::Active),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

/// Whether a row is read-only or showing the edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    View,
    Edit,
}

/// Everything the controller owns, as published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListState {
    /// Full snapshot from the last successful reload, in server order
    pub tasks: Vec<Task>,
    /// Text of the "new task" input
    pub draft_name: String,
    /// Edit buffer; at most one task at a time
    pub editing: Option<Task>,
    /// True while any store operation (or create dwell) is outstanding
    pub busy: bool,
    pub filter: TaskFilter,
}

impl TaskListState {
    /// Tasks passing the current filter, in server order.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        let filter = self.filter;
        self.tasks.iter().filter(move |task| filter.matches(task))
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn row_mode(&self, id: TaskId) -> RowMode {
        match &self.editing {
            Some(task) if task.id == id => RowMode::Edit,
            _ => RowMode::View,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.done).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, name: &str, done: bool) -> Task {
        Task {
            id,
            name: name.into(),
            done,
        }
    }

    fn sample() -> TaskListState {
        TaskListState {
            tasks: vec![
                task(1, "Buy milk", false),
                task(2, "Pay rent", true),
                task(3, "Call mum", false),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn filter_views_leave_snapshot_untouched() {
        let mut state = sample();

        state.filter = TaskFilter::Completed;
        let ids: Vec<_> = state.visible_tasks().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);

        state.filter = TaskFilter::Active;
        let ids: Vec<_> = state.visible_tasks().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(state.tasks.len(), 3);
    }

    #[test]
    fn row_mode_follows_edit_buffer() {
        let mut state = sample();
        assert_eq!(state.row_mode(1), RowMode::View);

        state.editing = Some(task(1, "Buy oat milk", false));
        assert_eq!(state.row_mode(1), RowMode::Edit);
        assert_eq!(state.row_mode(2), RowMode::View);
    }

    #[test]
    fn counts() {
        let state = sample();
        assert_eq!(state.completed_count(), 1);
        assert_eq!(state.remaining_count(), 2);
    }

    #[test]
    fn parse_filter() {
        assert_eq!("all".parse::<TaskFilter>(), Ok(TaskFilter::All));
        assert_eq!("Done".parse::<TaskFilter>(), Ok(TaskFilter::Completed));
        assert_eq!(" active ".parse::<TaskFilter>(), Ok(TaskFilter::Active));
        assert!("someday".parse::<TaskFilter>().is_err());
    }
}
