//! Task list front end: the synchronization controller and its console surface.

pub mod command;
pub mod controller;
pub mod dwell;
pub mod render;
pub mod state;

#[cfg(test)]
mod test_support;

pub use command::{execute, Command, CommandError, Flow, HELP};
pub use controller::{
    BulkDeleteReport, ControllerOptions, CreateOutcome, SaveOutcome, TaskController,
};
pub use dwell::MinimumDwell;
pub use render::render;
pub use state::{RowMode, TaskFilter, TaskListState};
