//! Plain-text rendering of controller state.

use std::fmt::Write;

use tasklist_services::Task;

use crate::state::{RowMode, TaskListState};

fn checkbox(task: &Task) -> &'static str {
    if task.done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Render the visible rows of `state`, one task per line.
pub fn render(state: &TaskListState) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Tasks ({}): {} remaining, {} completed",
        state.filter,
        state.remaining_count(),
        state.completed_count()
    );

    if state.busy {
        out.push_str("  Loading...\n");
    }

    let mut shown = 0;
    for task in state.visible_tasks() {
        shown += 1;
        match (state.row_mode(task.id), &state.editing) {
            (RowMode::Edit, Some(buffer)) => {
                let _ = writeln!(out, "  {} #{:<4} edit> {}", checkbox(task), task.id, buffer.name);
            }
            _ => {
                let _ = writeln!(out, "  {} #{:<4} {}", checkbox(task), task.id, task.name);
            }
        }
    }

    if shown == 0 {
        out.push_str("  (no tasks)\n");
    }

    if !state.draft_name.is_empty() {
        let _ = writeln!(out, "  new> {}", state.draft_name);
    }

    out
}
