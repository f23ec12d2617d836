//! Task synchronization controller.
//!
//! Owns the task snapshot, the draft text, the edit buffer and the busy flag.
//! Every mutation goes to the store first and is followed by a full reload;
//! local state is never patched optimistically. Rendering layers observe the
//! state through `subscribe()`.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tasklist_core::{Config, NetworkError};
use tasklist_services::{NewTask, Task, TaskId, TaskStore};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::dwell::MinimumDwell;
use crate::state::{TaskFilter, TaskListState};

/// Tunables for a controller session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Minimum busy period after `create_task`; zero disables it
    pub min_create_busy: Duration,
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_create_busy: config.min_create_busy(),
        }
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            min_create_busy: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Name was empty after trimming; nothing was sent
    Skipped,
    /// Carries the server-assigned id when the store reported one
    Created(Option<TaskId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    NothingToSave,
    Saved(TaskId),
}

/// Outcome of `delete_completed` / `delete_all`.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub requested: usize,
    pub deleted: usize,
    pub failed: Vec<(TaskId, NetworkError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BulkDeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} deleted", self.deleted, self.requested)
    }
}

struct Shared {
    state: watch::Sender<TaskListState>,
    in_flight: AtomicUsize,
}

impl Shared {
    /// Adjust the in-flight counter and derive `busy` from it.
    ///
    /// The counter only changes inside the watch lock, so `busy` always
    /// matches it.
    fn adjust_busy(&self, entering: bool) {
        self.state.send_if_modified(|state| {
            let count = if entering {
                self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
            } else {
                self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1)
            };
            let busy = count > 0;
            let changed = state.busy != busy;
            state.busy = busy;
            changed
        });
    }
}

/// Marks one outstanding operation; `busy` clears when the last guard drops.
struct BusyGuard {
    shared: Arc<Shared>,
}

impl BusyGuard {
    fn enter(shared: &Arc<Shared>) -> Self {
        shared.adjust_busy(true);
        Self {
            shared: shared.clone(),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.shared.adjust_busy(false);
    }
}

pub struct TaskController {
    store: Arc<dyn TaskStore>,
    shared: Arc<Shared>,
    dwell: MinimumDwell,
    shutdown: CancellationToken,
}

impl TaskController {
    /// Start a session against `store`. Call `reload()` to fetch the initial list.
    pub fn create(store: Arc<dyn TaskStore>, options: ControllerOptions) -> Self {
        let (state, _) = watch::channel(TaskListState::default());
        tracing::debug!(
            "Task controller created (min create busy {:?})",
            options.min_create_busy
        );

        Self {
            store,
            shared: Arc::new(Shared {
                state,
                in_flight: AtomicUsize::new(0),
            }),
            dwell: MinimumDwell::new(options.min_create_busy),
            shutdown: CancellationToken::new(),
        }
    }

    /// End the session: pending dwell timers are cancelled and subscribers
    /// see the channel close once they have been released.
    pub fn dispose(self) {
        tracing::debug!("Task controller disposed");
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> TaskListState {
        self.shared.state.borrow().clone()
    }

    fn busy(&self) -> BusyGuard {
        BusyGuard::enter(&self.shared)
    }

    /// Replace the snapshot with the store's full collection.
    ///
    /// On failure the previous snapshot is kept and the error is logged and
    /// returned.
    pub async fn reload(&self) -> Result<(), NetworkError> {
        let _busy = self.busy();

        match self.store.list().await {
            Ok(tasks) => {
                tracing::debug!("Reloaded {} tasks", tasks.len());
                self.shared.state.send_modify(|state| state.tasks = tasks);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load tasks: {}", e);
                Err(e)
            }
        }
    }

    pub fn set_draft_name(&self, text: &str) {
        self.shared
            .state
            .send_modify(|state| state.draft_name = text.to_string());
    }

    /// Create a task from the current draft text, clearing the draft on success.
    pub async fn submit_draft(&self) -> Result<CreateOutcome, NetworkError> {
        let draft = self.shared.state.borrow().draft_name.clone();
        self.create_named(&draft, true).await
    }

    /// Create a task named `name`, then reload. The draft is left alone.
    pub async fn create_task(&self, name: &str) -> Result<CreateOutcome, NetworkError> {
        self.create_named(name, false).await
    }

    /// Blank names are ignored without a request. With a minimum dwell
    /// configured, `busy` stays set until the dwell has elapsed from the start
    /// of this call, whether or not the create succeeded.
    async fn create_named(&self, name: &str, from_draft: bool) -> Result<CreateOutcome, NetworkError> {
        if name.trim().is_empty() {
            tracing::debug!("Ignoring blank task name");
            return Ok(CreateOutcome::Skipped);
        }

        let started = Instant::now();
        let busy = self.busy();
        let result = self.create_and_reload(name, from_draft).await;
        self.release_after_dwell(busy, started);
        result
    }

    async fn create_and_reload(
        &self,
        name: &str,
        from_draft: bool,
    ) -> Result<CreateOutcome, NetworkError> {
        let id = match self.store.create(&NewTask::new(name)).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to create task: {}", e);
                return Err(e);
            }
        };

        match id {
            Some(id) => tracing::info!("Created task {}", id),
            None => tracing::info!("Created task '{}'", name),
        }
        if from_draft {
            self.shared.state.send_modify(|state| state.draft_name.clear());
        }
        let _ = self.reload().await;
        Ok(CreateOutcome::Created(id))
    }

    /// Hold `busy` until the dwell floor has passed, off the caller's path.
    fn release_after_dwell(&self, busy: BusyGuard, started: Instant) {
        let remaining = self.dwell.remaining(started);
        if remaining.is_zero() {
            return;
        }

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(remaining) => {}
                () = shutdown.cancelled() => {}
            }
            drop(busy);
        });
    }

    /// Flip `done` on the stored record, then reload.
    pub async fn toggle_done(&self, task: &Task) -> Result<(), NetworkError> {
        let _busy = self.busy();
        let toggled = task.toggled();

        if let Err(e) = self.store.update(&toggled).await {
            tracing::warn!("Failed to toggle task {}: {}", task.id, e);
            return Err(e);
        }

        tracing::info!("Task {} marked done={}", task.id, toggled.done);
        let _ = self.reload().await;
        Ok(())
    }

    /// Put a copy of `task` in the edit buffer, replacing any previous edit.
    pub fn begin_edit(&self, task: &Task) {
        let task = task.clone();
        self.shared
            .state
            .send_modify(|state| state.editing = Some(task));
    }

    /// Change the buffered name. Returns false when nothing is being edited.
    pub fn update_edit_name(&self, name: &str) -> bool {
        self.shared.state.send_if_modified(|state| match state.editing.as_mut() {
            Some(task) => {
                task.name = name.to_string();
                true
            }
            None => false,
        })
    }

    pub fn cancel_edit(&self) -> bool {
        self.shared
            .state
            .send_if_modified(|state| state.editing.take().is_some())
    }

    /// Send the whole buffered record, then reload.
    ///
    /// The buffer is cleared only on success so a failed save can be retried.
    pub async fn save_edit(&self) -> Result<SaveOutcome, NetworkError> {
        let editing = self.shared.state.borrow().editing.clone();
        let Some(task) = editing else {
            return Ok(SaveOutcome::NothingToSave);
        };

        let _busy = self.busy();

        if let Err(e) = self.store.update(&task).await {
            tracing::warn!("Failed to save task {}: {}", task.id, e);
            return Err(e);
        }

        tracing::info!("Saved task {}", task.id);
        self.shared.state.send_if_modified(|state| {
            if state.editing.as_ref().map(|t| t.id) == Some(task.id) {
                state.editing = None;
                true
            } else {
                false
            }
        });
        let _ = self.reload().await;
        Ok(SaveOutcome::Saved(task.id))
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<(), NetworkError> {
        let _busy = self.busy();

        if let Err(e) = self.store.delete(id).await {
            tracing::warn!("Failed to delete task {}: {}", id, e);
            return Err(e);
        }

        tracing::info!("Deleted task {}", id);
        let _ = self.reload().await;
        Ok(())
    }

    /// Delete every task currently marked done.
    pub async fn delete_completed(&self) -> BulkDeleteReport {
        self.delete_matching(|task| task.done).await
    }

    pub async fn delete_all(&self) -> BulkDeleteReport {
        self.delete_matching(|_| true).await
    }

    /// Fire one delete per selected task, wait for all of them, then reload once.
    async fn delete_matching(&self, predicate: impl Fn(&Task) -> bool) -> BulkDeleteReport {
        let ids: Vec<TaskId> = self
            .shared
            .state
            .borrow()
            .tasks
            .iter()
            .filter(|task| predicate(task))
            .map(|task| task.id)
            .collect();

        let mut report = BulkDeleteReport {
            requested: ids.len(),
            ..Default::default()
        };
        if ids.is_empty() {
            return report;
        }

        let _busy = self.busy();
        let results = join_all(ids.into_iter().map(|id| async move {
            (id, self.store.delete(id).await)
        }))
        .await;

        for (id, result) in results {
            match result {
                Ok(()) => report.deleted += 1,
                Err(e) => report.failed.push((id, e)),
            }
        }

        if report.is_complete() {
            tracing::info!("Bulk delete: {}", report);
        } else {
            tracing::warn!("Bulk delete incomplete: {}", report);
        }

        let _ = self.reload().await;
        report
    }

    pub fn set_filter(&self, filter: TaskFilter) {
        self.shared.state.send_if_modified(|state| {
            let changed = state.filter != filter;
            state.filter = filter;
            changed
        });
    }
}

impl Drop for TaskController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
