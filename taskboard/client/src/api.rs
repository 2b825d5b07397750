//! Typed access to the task REST API.
//!
//! This module provides:
//! - The [`TaskApi`] trait that the board state is written against
//! - [`TaskClient`], the reqwest-backed implementation
//! - [`with_cancellation`] for making a request abortable by a newer one

use async_trait::async_trait;
use futures::future::{AbortRegistration, Abortable};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::future::Future;
use std::time::Duration;
use taskboard_core::{
    ErrorBody, ErrorCode, ErrorResponse, FieldError, NewTask, Task, TaskChanges, TaskId,
    TaskListQuery, TaskPage,
};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    /// A newer request superseded this one. Not a failure.
    #[error("Request was cancelled")]
    Cancelled,
    /// The API answered with a non-success status.
    #[error("API responded with status {status}: {}", describe(.error))]
    Api {
        status: u16,
        error: Option<ErrorBody>,
    },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unreadable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn describe(error: &Option<ErrorBody>) -> &str {
    error
        .as_ref()
        .map_or("no error body", |body| body.message.as_str())
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api {
                error: Some(body), ..
            } => Some(body.code),
            _ => None,
        }
    }

    /// Per-field validation messages, empty unless the API rejected the payload.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Api {
                error: Some(ErrorBody {
                    fields: Some(fields),
                    ..
                }),
                ..
            } => fields,
            _ => &[],
        }
    }
}

/// Operations the task board needs from the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetches one page of tasks.
    async fn list_tasks(&self, query: TaskListQuery) -> Result<TaskPage, ClientError>;

    async fn get_task(&self, id: TaskId) -> Result<Task, ClientError>;

    async fn create_task(&self, new_task: NewTask) -> Result<Task, ClientError>;

    /// Merges `changes` into the task with `PUT`.
    async fn update_task(&self, id: TaskId, changes: TaskChanges) -> Result<Task, ClientError>;

    /// Merges `changes` into the task with `PATCH`.
    async fn patch_task(&self, id: TaskId, changes: TaskChanges) -> Result<Task, ClientError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), ClientError>;
}

/// Runs `request` until it completes or the paired `AbortHandle` fires.
///
/// # Returns
///
/// The request's own result, or `ClientError::Cancelled` if it was aborted first.
pub async fn with_cancellation<F, T>(
    request: F,
    registration: AbortRegistration,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    Abortable::new(request, registration)
        .await
        .unwrap_or(Err(ClientError::Cancelled))
}

/// `TaskApi` over HTTP. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    /// Creates a client for the server at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/api/tasks/{}", self.base_url, id)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let error = serde_json::from_slice::<ErrorResponse>(&body)
            .ok()
            .map(|response| response.error);
        if status != StatusCode::NOT_FOUND {
            tracing::warn!(status = status.as_u16(), "Task API request failed");
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            error,
        })
    }
}

#[async_trait]
impl TaskApi for TaskClient {
    #[tracing::instrument(skip(self))]
    async fn list_tasks(&self, query: TaskListQuery) -> Result<TaskPage, ClientError> {
        Self::send(self.http.get(self.tasks_url()).query(&query)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_task(&self, id: TaskId) -> Result<Task, ClientError> {
        Self::send(self.http.get(self.task_url(id))).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_task(&self, new_task: NewTask) -> Result<Task, ClientError> {
        Self::send(self.http.post(self.tasks_url()).json(&new_task)).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_task(&self, id: TaskId, changes: TaskChanges) -> Result<Task, ClientError> {
        Self::send(self.http.put(self.task_url(id)).json(&changes)).await
    }

    #[tracing::instrument(skip(self))]
    async fn patch_task(&self, id: TaskId, changes: TaskChanges) -> Result<Task, ClientError> {
        Self::send(self.http.patch(self.task_url(id)).json(&changes)).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        let _: IgnoredAny = Self::send(self.http.delete(self.task_url(id))).await?;
        Ok(())
    }
}
