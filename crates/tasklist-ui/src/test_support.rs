//! In-memory task store for controller tests.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tasklist_core::NetworkError;
use tasklist_services::{NewTask, Task, TaskId, TaskStore, TaskStoreResult};
use tokio::sync::Notify;

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: TaskId,
    calls: Vec<String>,
    fail_all: bool,
    fail_delete: HashSet<TaskId>,
    omit_created_ids: bool,
}

/// Behaves like the remote store: assigns ids, keeps insertion order, and can
/// be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let store = Self::default();
        {
            let mut inner = store.inner.lock();
            inner.tasks = tasks;
            inner.next_id = next_id;
        }
        Arc::new(store)
    }

    pub fn empty() -> Arc<Self> {
        Self::with_tasks(Vec::new())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.inner.lock().tasks.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Make every request fail (simulates the server being down)
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().fail_all = failing;
    }

    pub fn fail_delete_of(&self, id: TaskId) {
        self.inner.lock().fail_delete.insert(id);
    }

    /// Answer creates without the new record, like a server replying with text
    pub fn omit_created_ids(&self) {
        self.inner.lock().omit_created_ids = true;
    }

    /// Hold every `list` call until the returned notify is signalled
    pub fn gate_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock() = Some(gate.clone());
        gate
    }

    fn record(&self, call: String) -> TaskStoreResult<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.fail_all {
            return Err(NetworkError::ServerError {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self) -> TaskStoreResult<Vec<Task>> {
        let gate = self.list_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.record("list".into())?;
        Ok(self.tasks())
    }

    async fn create(&self, task: &NewTask) -> TaskStoreResult<Option<TaskId>> {
        self.record(format!("create {}", task.name))?;
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let created = Task {
            id: inner.next_id,
            name: task.name.clone(),
            done: task.done,
        };
        inner.tasks.push(created);
        Ok((!inner.omit_created_ids).then_some(inner.next_id))
    }

    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        self.record(format!("update {}", task.id))?;
        let mut inner = self.inner.lock();
        match inner.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(())
            }
            None => Err(NetworkError::ServerError {
                status: 404,
                message: format!("no task {}", task.id),
            }),
        }
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.record(format!("delete {}", id))?;
        let mut inner = self.inner.lock();
        if inner.fail_delete.contains(&id) {
            return Err(NetworkError::ConnectionFailed("reset by peer".into()));
        }
        inner.tasks.retain(|t| t.id != id);
        Ok(())
    }
}

pub fn task(id: TaskId, name: &str, done: bool) -> Task {
    Task {
        id,
        name: name.into(),
        done,
    }
}
