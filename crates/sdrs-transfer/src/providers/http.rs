//! Storage Transfer REST API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info};

use sdrs_core::config::TransferConfig;
use sdrs_core::error::{AppError, ErrorKind};
use sdrs_core::result::AppResult;
use sdrs_core::traits::transfer::{
    CreateRecurringTransferJob, CreateTransferJob, TransferClient, TransferJob, TransferJobStatus,
    TransferSpec, retention_duration,
};

use crate::wire::{UpdateTransferJobRequest, WireTransferJob};

/// Fields replaced by every update call.
const UPDATE_FIELD_MASK: &str = "description,status,transferSpec";

/// Transfer client backed by the Storage Transfer REST API.
#[derive(Debug, Clone)]
pub struct HttpTransferClient {
    /// Shared HTTP client.
    client: Client,
    /// API base URL, without trailing slash.
    endpoint: String,
    /// Bearer token attached to each request.
    access_token: Option<String>,
}

impl HttpTransferClient {
    /// Create a client from the transfer configuration.
    pub fn new(config: &TransferConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build transfer HTTP client",
                    e,
                )
            })?;

        info!(endpoint = %config.endpoint, "Initializing Storage Transfer client");

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        self.authorize(request).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Transfer service request failed: {action}"),
                e,
            )
        })
    }

    async fn read_job(response: Response, action: &str) -> AppResult<TransferJob> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "Transfer service returned {status} while trying to {action}: {body}"
            )));
        }

        let wire: WireTransferJob = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to decode transfer job while trying to {action}"),
                e,
            )
        })?;
        TransferJob::try_from(wire)
    }

    async fn post_job(&self, job: TransferJob) -> AppResult<TransferJob> {
        let body = WireTransferJob::from(&job);
        let url = format!("{}/transferJobs", self.endpoint);
        let response = self
            .send(self.client.post(url).json(&body), "create job")
            .await?;
        let created = Self::read_job(response, "create job").await?;
        debug!(name = %created.name, project_id = %created.project_id, "Created transfer job");
        Ok(created)
    }
}

#[async_trait]
impl TransferClient for HttpTransferClient {
    fn provider_type(&self) -> &str {
        "http"
    }

    async fn create_job(&self, request: CreateTransferJob) -> AppResult<TransferJob> {
        self.post_job(TransferJob {
            name: String::new(),
            project_id: request.project_id,
            description: request.description,
            status: TransferJobStatus::Enabled,
            spec: TransferSpec {
                source_bucket: request.source_bucket,
                destination_bucket: request.destination_bucket,
                include_prefixes: request.include_prefixes,
                exclude_prefixes: Vec::new(),
                min_retention_duration: None,
                schedule_time: request.schedule_time,
                recurring: false,
            },
        })
        .await
    }

    async fn create_recurring_job(
        &self,
        request: CreateRecurringTransferJob,
    ) -> AppResult<TransferJob> {
        self.post_job(TransferJob {
            name: String::new(),
            project_id: request.project_id,
            description: request.description,
            status: TransferJobStatus::Enabled,
            spec: TransferSpec {
                source_bucket: request.source_bucket,
                destination_bucket: request.destination_bucket,
                include_prefixes: Vec::new(),
                exclude_prefixes: request.exclude_prefixes,
                min_retention_duration: Some(retention_duration(request.retention_days)),
                schedule_time: request.schedule_time,
                recurring: true,
            },
        })
        .await
    }

    async fn get_job(&self, project_id: &str, job_name: &str) -> AppResult<Option<TransferJob>> {
        let url = format!("{}/{}?projectId={}", self.endpoint, job_name, project_id);
        let response = self.send(self.client.get(url), "get job").await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::read_job(response, "get job").await.map(Some)
    }

    async fn update_job(
        &self,
        job: &TransferJob,
        job_name: &str,
        project_id: &str,
    ) -> AppResult<TransferJob> {
        let mut transfer_job = WireTransferJob::from(job);
        transfer_job.name = job_name.to_string();
        transfer_job.project_id = project_id.to_string();

        let body = UpdateTransferJobRequest {
            project_id: project_id.to_string(),
            transfer_job,
            update_transfer_job_field_mask: UPDATE_FIELD_MASK.to_string(),
        };

        let url = format!("{}/{}", self.endpoint, job_name);
        let response = self
            .send(self.client.patch(url).json(&body), "update job")
            .await?;
        let updated = Self::read_job(response, "update job").await?;
        debug!(name = %updated.name, status = %updated.status, "Updated transfer job");
        Ok(updated)
    }
}
