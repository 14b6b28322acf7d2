//! In-memory transfer client.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_core::traits::transfer::{
    CreateRecurringTransferJob, CreateTransferJob, TransferClient, TransferJob, TransferJobStatus,
    TransferSpec, retention_duration,
};

/// Transfer client that keeps jobs in a process-local map.
///
/// Jobs are keyed by `(project_id, name)`. Every trait call is counted so
/// callers can assert that a failing operation never reached the service.
#[derive(Debug, Default)]
pub struct InMemoryTransferClient {
    /// Jobs keyed by project and job name.
    jobs: DashMap<(String, String), TransferJob>,
    /// Number of create calls.
    creates: AtomicUsize,
    /// Number of get calls.
    gets: AtomicUsize,
    /// Number of update calls.
    updates: AtomicUsize,
}

impl InMemoryTransferClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a job as-is, replacing any job with the same key.
    pub fn insert(&self, job: TransferJob) {
        self.jobs
            .insert((job.project_id.clone(), job.name.clone()), job);
    }

    /// Look a job up without counting a call.
    pub fn peek(&self, project_id: &str, job_name: &str) -> Option<TransferJob> {
        self.jobs
            .get(&(project_id.to_string(), job_name.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// Remove a job, as if it were deleted on the service side.
    pub fn remove(&self, project_id: &str, job_name: &str) -> Option<TransferJob> {
        self.jobs
            .remove(&(project_id.to_string(), job_name.to_string()))
            .map(|(_, job)| job)
    }

    /// All stored jobs, sorted by name.
    pub fn jobs(&self) -> Vec<TransferJob> {
        let mut jobs: Vec<TransferJob> = self.jobs.iter().map(|e| e.value().clone()).collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }

    /// Number of create calls (one-shot and recurring).
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of get calls.
    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of update calls.
    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Total number of calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.create_calls() + self.get_calls() + self.update_calls()
    }

    fn store_new(
        &self,
        project_id: String,
        description: String,
        spec: TransferSpec,
    ) -> TransferJob {
        let job = TransferJob {
            name: format!("transferJobs/{}", Uuid::new_v4().simple()),
            project_id,
            description,
            status: TransferJobStatus::Enabled,
            spec,
        };
        debug!(name = %job.name, project_id = %job.project_id, "Stored in-memory transfer job");
        self.insert(job.clone());
        job
    }
}

#[async_trait]
impl TransferClient for InMemoryTransferClient {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn create_job(&self, request: CreateTransferJob) -> AppResult<TransferJob> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let spec = TransferSpec {
            source_bucket: request.source_bucket,
            destination_bucket: request.destination_bucket,
            include_prefixes: request.include_prefixes,
            exclude_prefixes: Vec::new(),
            min_retention_duration: None,
            schedule_time: request.schedule_time,
            recurring: false,
        };
        Ok(self.store_new(request.project_id, request.description, spec))
    }

    async fn create_recurring_job(
        &self,
        request: CreateRecurringTransferJob,
    ) -> AppResult<TransferJob> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let spec = TransferSpec {
            source_bucket: request.source_bucket,
            destination_bucket: request.destination_bucket,
            include_prefixes: Vec::new(),
            exclude_prefixes: request.exclude_prefixes,
            min_retention_duration: Some(retention_duration(request.retention_days)),
            schedule_time: request.schedule_time,
            recurring: true,
        };
        Ok(self.store_new(request.project_id, request.description, spec))
    }

    async fn get_job(&self, project_id: &str, job_name: &str) -> AppResult<Option<TransferJob>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.peek(project_id, job_name))
    }

    async fn update_job(
        &self,
        job: &TransferJob,
        job_name: &str,
        project_id: &str,
    ) -> AppResult<TransferJob> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let key = (project_id.to_string(), job_name.to_string());
        let mut entry = self.jobs.get_mut(&key).ok_or_else(|| {
            AppError::external_service(format!(
                "Transfer job {job_name} does not exist in project {project_id}"
            ))
        })?;

        let stored = entry.value_mut();
        stored.description = job.description.clone();
        stored.status = job.status;
        stored.spec = job.spec.clone();
        Ok(stored.clone())
    }
}
