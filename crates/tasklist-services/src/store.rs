//! Task store trait.
//!
//! `TaskStore` abstracts over the remote collection so the controller can be
//! driven by the HTTP client in production and by in-memory stores in tests.

use async_trait::async_trait;
use tasklist_core::NetworkError;

use crate::task::{NewTask, Task, TaskId};

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, NetworkError>;

/// CRUD operations against the durable task collection.
///
/// Transport failures and non-2xx responses are both reported as
/// `NetworkError`; callers must not rely on telling them apart.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch the whole collection in server order.
    async fn list(&self) -> TaskStoreResult<Vec<Task>>;

    /// Create a task. Returns the server-assigned id when the response
    /// carries the created record; any 2xx counts as success either way.
    async fn create(&self, task: &NewTask) -> TaskStoreResult<Option<TaskId>>;

    /// Replace the stored record addressed by `task.id` with `task`.
    /// The response body is not read.
    async fn update(&self, task: &Task) -> TaskStoreResult<()>;

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;
}
