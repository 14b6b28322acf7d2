//! Transfer collaborator trait and the job shapes exchanged with it.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

const SECONDS_PER_DAY: i64 = 86_400;

/// Encode a retention period as the duration string the transfer service
/// stores in `minTimeElapsedSinceLastModification` (e.g. `"2592000s"`).
pub fn retention_duration(days: i32) -> String {
    format!("{}s", i64::from(days) * SECONDS_PER_DAY)
}

/// Whether a transfer job is scheduled to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferJobStatus {
    /// The job runs on its schedule.
    Enabled,
    /// The job is kept but never runs.
    Disabled,
}

impl TransferJobStatus {
    /// Return the status as the uppercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for TransferJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a transfer job moves and when.
///
/// `include_prefixes` is used by one-shot dataset jobs and
/// `exclude_prefixes` by recurring bucket-wide jobs; a spec never carries
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSpec {
    /// Bucket objects are moved out of.
    pub source_bucket: String,
    /// Shadow bucket objects are moved into.
    pub destination_bucket: String,
    /// Only objects under these prefixes are moved.
    #[serde(default)]
    pub include_prefixes: Vec<String>,
    /// Objects under these prefixes are never moved.
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
    /// Minimum object age as a duration string (see [`retention_duration`]).
    #[serde(default)]
    pub min_retention_duration: Option<String>,
    /// First (or only) execution time.
    pub schedule_time: DateTime<Utc>,
    /// Whether the job repeats daily after `schedule_time`.
    #[serde(default)]
    pub recurring: bool,
}

/// A transfer job as known by the transfer service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferJob {
    /// Opaque job handle assigned by the service (`transferJobs/...`).
    pub name: String,
    /// Project owning the job.
    pub project_id: String,
    /// Free-form description, see the executor's naming convention.
    pub description: String,
    /// Enabled or disabled.
    pub status: TransferJobStatus,
    /// Transfer specification.
    pub spec: TransferSpec,
}

/// Parameters for a one-shot transfer of an explicit prefix set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransferJob {
    /// Project to create the job in.
    pub project_id: String,
    /// Source bucket name (no `gs://`).
    pub source_bucket: String,
    /// Destination bucket name.
    pub destination_bucket: String,
    /// Prefixes to move.
    pub include_prefixes: Vec<String>,
    /// Job description.
    pub description: String,
    /// When the job runs.
    pub schedule_time: DateTime<Utc>,
}

/// Parameters for a recurring bucket-wide transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecurringTransferJob {
    /// Project to create the job in.
    pub project_id: String,
    /// Source bucket name (no `gs://`).
    pub source_bucket: String,
    /// Destination bucket name.
    pub destination_bucket: String,
    /// Prefixes left untouched by the sweep.
    pub exclude_prefixes: Vec<String>,
    /// Job description.
    pub description: String,
    /// First execution; repeats daily afterwards.
    pub schedule_time: DateTime<Utc>,
    /// Minimum object age in days.
    pub retention_days: i32,
}

/// The external scheduled-transfer service.
///
/// Implementations live in `sdrs-transfer`. Every call is awaited to
/// completion by the caller; implementations do not retry.
#[async_trait]
pub trait TransferClient: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "memory", "http").
    fn provider_type(&self) -> &str;

    /// Create a one-shot job moving the given prefixes.
    async fn create_job(&self, request: CreateTransferJob) -> AppResult<TransferJob>;

    /// Create a daily job moving everything except the given prefixes.
    async fn create_recurring_job(
        &self,
        request: CreateRecurringTransferJob,
    ) -> AppResult<TransferJob>;

    /// Fetch a job. Returns `Ok(None)` when the service has no such job.
    async fn get_job(&self, project_id: &str, job_name: &str) -> AppResult<Option<TransferJob>>;

    /// Replace the description, status, and spec of an existing job.
    async fn update_job(
        &self,
        job: &TransferJob,
        job_name: &str,
        project_id: &str,
    ) -> AppResult<TransferJob>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_duration() {
        assert_eq!(retention_duration(0), "0s");
        assert_eq!(retention_duration(30), "2592000s");
        assert_eq!(retention_duration(200), "17280000s");
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TransferJobStatus::Disabled).unwrap();
        assert_eq!(json, "\"DISABLED\"");
    }
}
