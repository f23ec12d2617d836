//! Remote task store access for the task list client.
//!
//! Provides the `Task` wire types, the `TaskStore` trait and its HTTP
//! implementation.

pub mod client;
pub mod store;
pub mod task;

pub use client::HttpTaskStore;
pub use store::{TaskStore, TaskStoreResult};
pub use task::{NewTask, Task, TaskId};
