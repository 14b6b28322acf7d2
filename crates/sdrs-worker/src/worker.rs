//! Worker trait and the result a worker reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sdrs_core::error::AppError;

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Submitted or running.
    Pending,
    /// Finished normally.
    Success,
    /// Finished with an error or a panic.
    Failure,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Outcome of one worker execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResult {
    /// Unique execution id.
    pub id: Uuid,
    /// Worker name, for logs.
    pub name: String,
    /// Current state.
    pub status: WorkerStatus,
    /// Why the worker failed.
    pub cause: Option<String>,
    /// When the worker got a pool slot.
    pub start_time: Option<DateTime<Utc>>,
    /// When the worker was finalized.
    pub end_time: Option<DateTime<Utc>>,
}

impl WorkerResult {
    /// A pending result for a worker about to run.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            status: WorkerStatus::Pending,
            cause: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Mark the worker as successful.
    pub fn succeed(&mut self) {
        self.status = WorkerStatus::Success;
        self.cause = None;
    }

    /// Mark the worker as failed.
    pub fn fail(&mut self, cause: impl Into<String>) {
        self.status = WorkerStatus::Failure;
        self.cause = Some(cause.into());
    }

    /// Whether the worker has not reported an outcome yet.
    pub fn is_pending(&self) -> bool {
        self.status == WorkerStatus::Pending
    }
}

/// Error returned from [`Worker::do_work`].
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The work could not be completed.
    #[error("Worker failed: {0}")]
    Failed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// A unit of background work run by the [`JobManager`](crate::JobManager).
///
/// Workers are consumed on submission and run at most once. A worker that
/// returns `Ok` without touching the result is finalized as successful; a
/// returned error or a panic finalizes it as failed.
#[async_trait]
pub trait Worker: Send + Sync + std::fmt::Debug {
    /// Name used in logs and in the [`WorkerResult`].
    fn name(&self) -> String;

    /// Run the work, optionally recording the outcome in `result`.
    async fn do_work(&mut self, result: &mut WorkerResult) -> Result<(), WorkerError>;
}
