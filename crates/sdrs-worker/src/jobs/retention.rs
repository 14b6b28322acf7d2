//! Workers that run retention rules through the retention service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing;

use sdrs_service::RetentionService;

use crate::worker::{Worker, WorkerError, WorkerResult};

/// Runs every active dataset rule of one project.
#[derive(Debug)]
pub struct DatasetRuleWorker {
    /// Retention service
    service: Arc<RetentionService>,
    /// Project whose rules are executed
    project_id: String,
}

impl DatasetRuleWorker {
    /// Create a new dataset rule worker
    pub fn new(service: Arc<RetentionService>, project_id: impl Into<String>) -> Self {
        Self {
            service,
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl Worker for DatasetRuleWorker {
    fn name(&self) -> String {
        format!("dataset-rules:{}", self.project_id)
    }

    async fn do_work(&mut self, result: &mut WorkerResult) -> Result<(), WorkerError> {
        let jobs = self.service.execute_dataset_rules(&self.project_id).await?;
        tracing::info!(
            "Dataset rules of project '{}' produced {} transfer jobs",
            self.project_id,
            jobs.len()
        );
        result.succeed();
        Ok(())
    }
}

/// What to do with the global rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalRuleAction {
    /// Create missing global jobs and update drifted ones.
    Apply,
    /// Disable all global jobs.
    Cancel,
}

/// Applies or cancels the global rule.
#[derive(Debug)]
pub struct GlobalRuleWorker {
    /// Retention service
    service: Arc<RetentionService>,
    /// Requested action
    action: GlobalRuleAction,
}

impl GlobalRuleWorker {
    /// Create a new global rule worker
    pub fn new(service: Arc<RetentionService>, action: GlobalRuleAction) -> Self {
        Self { service, action }
    }
}

#[async_trait]
impl Worker for GlobalRuleWorker {
    fn name(&self) -> String {
        match self.action {
            GlobalRuleAction::Apply => "global-rule:apply".to_string(),
            GlobalRuleAction::Cancel => "global-rule:cancel".to_string(),
        }
    }

    async fn do_work(&mut self, result: &mut WorkerResult) -> Result<(), WorkerError> {
        let jobs = match self.action {
            GlobalRuleAction::Apply => self.service.apply_global_rule().await?,
            GlobalRuleAction::Cancel => self.service.cancel_global_rule().await?,
        };
        tracing::info!("Global rule {:?} touched {} transfer jobs", self.action, jobs.len());
        result.succeed();
        Ok(())
    }
}

/// Moves the folder holding a user-selected target immediately.
#[derive(Debug)]
pub struct UserRuleWorker {
    /// Retention service
    service: Arc<RetentionService>,
    /// Project owning the target
    project_id: String,
    /// `gs://bucket/dataset/...` path chosen by the user
    target: String,
}

impl UserRuleWorker {
    /// Create a new user rule worker
    pub fn new(
        service: Arc<RetentionService>,
        project_id: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            service,
            project_id: project_id.into(),
            target: target.into(),
        }
    }
}

#[async_trait]
impl Worker for UserRuleWorker {
    fn name(&self) -> String {
        format!("user-rule:{}", self.target)
    }

    async fn do_work(&mut self, result: &mut WorkerResult) -> Result<(), WorkerError> {
        let jobs = self
            .service
            .execute_user_rule(&self.project_id, &self.target)
            .await?;
        match jobs.first() {
            Some(job) => {
                tracing::info!("User request for '{}' created job {}", self.target, job.name);
                result.succeed();
            }
            None => result.fail(format!("Nothing to move under '{}'", self.target)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdrs_core::config::TransferConfig;
    use sdrs_entity::rule::{RetentionRule, RetentionRuleType};
    use sdrs_service::{
        InMemoryJobRepository, InMemoryRuleRepository, RetentionRuleExecutor,
        RetentionRuleRepository,
    };
    use sdrs_transfer::InMemoryTransferClient;

    use crate::worker::WorkerStatus;

    fn service(rules: Arc<InMemoryRuleRepository>) -> Arc<RetentionService> {
        let client = Arc::new(InMemoryTransferClient::new());
        let executor = Arc::new(RetentionRuleExecutor::new(client, TransferConfig::default()));
        Arc::new(RetentionService::new(
            rules,
            Arc::new(InMemoryJobRepository::new()),
            executor,
            3,
        ))
    }

    #[tokio::test]
    async fn test_dataset_worker_succeeds() {
        let rules = Arc::new(InMemoryRuleRepository::new());
        rules
            .save(RetentionRule::new(RetentionRuleType::Dataset, "p", "gs://b/d", 30))
            .await
            .unwrap();

        let mut worker = DatasetRuleWorker::new(service(rules), "p");
        let mut result = WorkerResult::new(worker.name());
        worker.do_work(&mut result).await.unwrap();
        assert_eq!(result.status, WorkerStatus::Success);
        assert_eq!(result.name, "dataset-rules:p");
    }

    #[tokio::test]
    async fn test_global_worker_without_rule_errors() {
        let mut worker = GlobalRuleWorker::new(
            service(Arc::new(InMemoryRuleRepository::new())),
            GlobalRuleAction::Apply,
        );
        let mut result = WorkerResult::new(worker.name());
        let err = worker.do_work(&mut result).await.unwrap_err();
        assert!(matches!(err, WorkerError::Internal(_)));
    }

    #[tokio::test]
    async fn test_user_worker_rejects_bucket_root() {
        let mut worker = UserRuleWorker::new(
            service(Arc::new(InMemoryRuleRepository::new())),
            "p",
            "gs://bucket/file.avro",
        );
        let mut result = WorkerResult::new(worker.name());
        assert!(worker.do_work(&mut result).await.is_err());
        assert!(result.is_pending());
    }
}
