//! Task types exchanged with the remote task store.

use serde::{Deserialize, Serialize};

/// Server-assigned task identifier.
pub type TaskId = i64;

/// A single task as the store returns it.
///
/// Wire shape: `{"id": 1, "taskName": "Buy milk", "done": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "taskName")]
    pub name: String,
    pub done: bool,
}

impl Task {
    /// Copy of this task with `done` flipped and every other field unchanged.
    pub fn toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }
}

/// Request body for creating a task. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    #[serde(rename = "taskName")]
    pub name: String,
    pub done: bool,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_wire_shape() {
        let task: Task =
            serde_json::from_str(r#"{"id":7,"taskName":"Buy milk","done":true}"#).unwrap();
        assert_eq!(
            task,
            Task {
                id: 7,
                name: "Buy milk".into(),
                done: true,
            }
        );
    }

    #[test]
    fn test_task_serializes_full_record() {
        let task = Task {
            id: 3,
            name: "Write report".into(),
            done: false,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":3,"taskName":"Write report","done":false}"#);
    }

    #[test]
    fn test_new_task_defaults_to_not_done() {
        let json = serde_json::to_string(&NewTask::new("Walk dog")).unwrap();
        assert_eq!(json, r#"{"taskName":"Walk dog","done":false}"#);
    }

    #[test]
    fn test_toggled_only_flips_done() {
        let task = Task {
            id: 9,
            name: "Pay rent".into(),
            done: false,
        };
        let toggled = task.toggled();
        assert_eq!(toggled.id, 9);
        assert_eq!(toggled.name, "Pay rent");
        assert!(toggled.done);
        assert!(!toggled.toggled().done);
    }
}
