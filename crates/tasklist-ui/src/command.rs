//! Console commands: parsing input lines and dispatching them to the controller.

use tasklist_core::NetworkError;
use tasklist_services::TaskId;
use thiserror::Error;

use crate::controller::{CreateOutcome, SaveOutcome, TaskController};
use crate::render::render;
use crate::state::TaskFilter;

pub const HELP: &str = "\
Commands:
  list                   show tasks
  add <name>             create a task
  draft <text>           set the new-task input
  submit                 create a task from the input
  toggle <id>            flip done/not done
  edit <id>              start editing a task
  rename <text>          change the name being edited
  save                   save the edit
  cancel                 discard the edit
  delete <id>            delete a task
  clear-done             delete completed tasks
  clear-all              delete every task
  filter <all|done|active>
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(String),
    Draft(String),
    Submit,
    Toggle(TaskId),
    Edit(TaskId),
    Rename(String),
    Save,
    Cancel,
    Delete(TaskId),
    ClearDone,
    ClearAll,
    Filter(TaskFilter),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a task id")]
    InvalidId(String),

    #[error("{0}")]
    InvalidFilter(String),
}

fn parse_id(command: &'static str, arg: &str) -> Result<TaskId, CommandError> {
    let arg = arg.trim().trim_start_matches('#');
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a task id",
        });
    }
    arg.parse()
        .map_err(|_| CommandError::InvalidId(arg.to_string()))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "list" | "ls" => Ok(Command::List),
            "add" => Ok(Command::Add(rest.to_string())),
            "draft" => Ok(Command::Draft(rest.to_string())),
            "submit" => Ok(Command::Submit),
            "toggle" => parse_id("toggle", rest).map(Command::Toggle),
            "edit" => parse_id("edit", rest).map(Command::Edit),
            "rename" => Ok(Command::Rename(rest.to_string())),
            "save" => Ok(Command::Save),
            "cancel" => Ok(Command::Cancel),
            "delete" | "rm" => parse_id("delete", rest).map(Command::Delete),
            "clear-done" => Ok(Command::ClearDone),
            "clear-all" => Ok(Command::ClearAll),
            "filter" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "filter",
                        what: "all, done or active",
                    });
                }
                rest.parse()
                    .map(Command::Filter)
                    .map_err(CommandError::InvalidFilter)
            }
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn created_message(result: Result<CreateOutcome, NetworkError>) -> Option<String> {
    match result {
        Ok(CreateOutcome::Created(Some(id))) => Some(format!("Added #{}", id)),
        Ok(CreateOutcome::Created(None)) => Some("Added".to_string()),
        Ok(CreateOutcome::Skipped) | Err(_) => None,
    }
}

/// What the console should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Option<String>),
    Quit,
}

/// Run `command` against the controller.
///
/// Store failures are not turned into messages; the controller has already
/// logged them and the unchanged list is the only visible effect.
pub async fn execute(controller: &TaskController, command: Command) -> Flow {
    let message = match command {
        Command::List => Some(render(&controller.snapshot())),
        Command::Add(name) => created_message(controller.create_task(&name).await),
        Command::Draft(text) => {
            controller.set_draft_name(&text);
            None
        }
        Command::Submit => created_message(controller.submit_draft().await),
        Command::Toggle(id) => match controller.snapshot().find(id).cloned() {
            Some(task) => {
                let _ = controller.toggle_done(&task).await;
                None
            }
            None => Some(format!("No task #{}", id)),
        },
        Command::Edit(id) => match controller.snapshot().find(id).cloned() {
            Some(task) => {
                controller.begin_edit(&task);
                None
            }
            None => Some(format!("No task #{}", id)),
        },
        Command::Rename(text) => {
            if controller.update_edit_name(&text) {
                None
            } else {
                Some("Nothing is being edited".to_string())
            }
        }
        Command::Save => match controller.save_edit().await {
            Ok(SaveOutcome::NothingToSave) => Some("Nothing is being edited".to_string()),
            Ok(SaveOutcome::Saved(_)) | Err(_) => None,
        },
        Command::Cancel => {
            controller.cancel_edit();
            None
        }
        Command::Delete(id) => {
            let _ = controller.delete_task(id).await;
            None
        }
        Command::ClearDone => Some(controller.delete_completed().await.to_string()),
        Command::ClearAll => Some(controller.delete_all().await.to_string()),
        Command::Filter(filter) => {
            controller.set_filter(filter);
            None
        }
        Command::Help => Some(HELP.to_string()),
        Command::Quit => return Flow::Quit,
    };

    Flow::Continue(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerOptions;
    use crate::test_support::{task, MemoryStore};

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("list"), Ok(Command::List));
        assert_eq!(
            Command::parse("  add   Buy milk  "),
            Ok(Command::Add("Buy milk".into()))
        );
        assert_eq!(Command::parse("add"), Ok(Command::Add(String::new())));
        assert_eq!(Command::parse("toggle #3"), Ok(Command::Toggle(3)));
        assert_eq!(Command::parse("RM 12"), Ok(Command::Delete(12)));
        assert_eq!(
            Command::parse("filter done"),
            Ok(Command::Filter(TaskFilter::Completed))
        );
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("fly"),
            Err(CommandError::Unknown("fly".into()))
        );
        assert_eq!(
            Command::parse("toggle abc"),
            Err(CommandError::InvalidId("abc".into()))
        );
        assert!(matches!(
            Command::parse("edit"),
            Err(CommandError::MissingArgument { command: "edit", .. })
        ));
        assert!(matches!(
            Command::parse("filter someday"),
            Err(CommandError::InvalidFilter(_))
        ));
    }

    #[tokio::test]
    async fn edit_flow_through_console() {
        let store = MemoryStore::with_tasks(vec![task(1, "Buy milk", false)]);
        let controller = TaskController::create(store.clone(), ControllerOptions::default());
        controller.reload().await.unwrap();

        for line in ["edit 1", "rename Buy oat milk", "save"] {
            let command = Command::parse(line).unwrap();
            assert_eq!(execute(&controller, command).await, Flow::Continue(None));
        }

        assert_eq!(store.tasks()[0].name, "Buy oat milk");
        assert!(controller.snapshot().editing.is_none());
    }

    #[tokio::test]
    async fn add_leaves_draft_for_submit() {
        let store = MemoryStore::empty();
        let controller = TaskController::create(store.clone(), ControllerOptions::default());

        for line in ["draft Walk dog", "add Buy milk"] {
            execute(&controller, Command::parse(line).unwrap()).await;
        }
        assert_eq!(controller.snapshot().draft_name, "Walk dog");

        assert_eq!(
            execute(&controller, Command::Submit).await,
            Flow::Continue(Some("Added #2".into()))
        );
        let names: Vec<_> = store.tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Buy milk", "Walk dog"]);
        assert!(controller.snapshot().draft_name.is_empty());
    }

    #[tokio::test]
    async fn unknown_task_id_is_reported() {
        let controller = TaskController::create(MemoryStore::empty(), ControllerOptions::default());

        assert_eq!(
            execute(&controller, Command::Toggle(5)).await,
            Flow::Continue(Some("No task #5".into()))
        );
    }

    #[tokio::test]
    async fn clear_done_prints_report() {
        let store = MemoryStore::with_tasks(vec![task(1, "Open", false), task(2, "Done", true)]);
        let controller = TaskController::create(store.clone(), ControllerOptions::default());
        controller.reload().await.unwrap();

        assert_eq!(
            execute(&controller, Command::ClearDone).await,
            Flow::Continue(Some("1 of 1 deleted".into()))
        );
        assert_eq!(execute(&controller, Command::Quit).await, Flow::Quit);
    }
}
