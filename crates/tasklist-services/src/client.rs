// crates/tasklist-services/src/client.rs

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tasklist_core::{NetworkError, ReqwestErrorExt};
use tracing::instrument;
use url::Url;

use crate::store::{TaskStore, TaskStoreResult};
use crate::task::{NewTask, Task, TaskId};

/// HTTP client for the remote task store.
///
/// The collection lives at the configured endpoint; single tasks at
/// `{endpoint}/{id}`.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    endpoint: Url,
    client: Arc<Client>,
}

impl HttpTaskStore {
    /// Create a client for the collection at `endpoint`.
    ///
    /// Any query string or fragment on `endpoint` is dropped.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let mut endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid task store endpoint: {}", endpoint))?;

        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Task store endpoint cannot be a base URL: {}", endpoint);
        }
        endpoint.set_query(None);
        endpoint.set_fragment(None);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint,
            client: Arc::new(client),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn item_url(&self, id: TaskId) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    /// Turn non-2xx responses into errors, keeping the body for the log
    async fn check_response(response: reqwest::Response) -> TaskStoreResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> TaskStoreResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> TaskStoreResult<Vec<Task>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let tasks: Vec<Task> = Self::decode(Self::check_response(response).await?).await?;
        tracing::debug!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    #[instrument(skip(self), level = "debug")]
    async fn create(&self, task: &NewTask) -> TaskStoreResult<Option<TaskId>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(task)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let response = Self::check_response(response).await?;

        // Any 2xx means the task exists; the echoed record is optional
        let id = response.json::<Task>().await.ok().map(|created| created.id);
        match id {
            Some(id) => tracing::debug!("Created task {}", id),
            None => tracing::debug!("Created task (no record in response)"),
        }
        Ok(id)
    }

    #[instrument(skip(self), level = "debug")]
    async fn update(&self, task: &Task) -> TaskStoreResult<()> {
        let response = self
            .client
            .put(self.item_url(task.id))
            .json(task)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        Self::check_response(response).await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        Self::check_response(response).await?;
        Ok(())
    }
}
