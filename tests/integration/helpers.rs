//! Shared test helpers for integration tests.

use std::sync::Arc;

use sdrs_core::config::{TransferConfig, WorkerConfig};
use sdrs_entity::rule::{RetentionRule, RetentionRuleType};
use sdrs_service::{
    InMemoryJobRepository, InMemoryRuleRepository, RetentionRuleExecutor, RetentionRuleRepository,
    RetentionService,
};
use sdrs_transfer::InMemoryTransferClient;
use sdrs_worker::{JobManager, JobManagerMonitor, WorkerResult};

/// Test application context
pub struct TestApp {
    /// Transfer service stand-in
    pub client: Arc<InMemoryTransferClient>,
    /// Rule store
    pub rules: Arc<InMemoryRuleRepository>,
    /// Job store
    pub jobs: Arc<InMemoryJobRepository>,
    /// Retention service wired to the stores above
    pub service: Arc<RetentionService>,
    /// Pool under test
    pub manager: JobManager,
    /// Monitor of `manager`, driven by hand
    pub monitor: JobManagerMonitor,
}

impl TestApp {
    /// Create a new test application with default transfer settings
    pub fn new() -> Self {
        Self::with_transfer_config(TransferConfig::default())
    }

    /// Create a new test application with the given transfer settings
    pub fn with_transfer_config(transfer: TransferConfig) -> Self {
        let client = Arc::new(InMemoryTransferClient::new());
        let rules = Arc::new(InMemoryRuleRepository::new());
        let jobs = Arc::new(InMemoryJobRepository::new());
        let executor = Arc::new(RetentionRuleExecutor::new(client.clone(), transfer));
        let service = Arc::new(RetentionService::new(
            rules.clone(),
            jobs.clone(),
            executor,
            3,
        ));
        let (manager, monitor) = JobManager::new(WorkerConfig {
            pool_size: 2,
            monitor_poll_interval_ms: 20,
            ..WorkerConfig::default()
        });

        Self {
            client,
            rules,
            jobs,
            service,
            manager,
            monitor,
        }
    }

    /// Store an active rule and return it with its id
    pub async fn seed_rule(
        &self,
        rule_type: RetentionRuleType,
        project_id: &str,
        data_storage_name: &str,
        retention_days: i32,
    ) -> RetentionRule {
        self.rules
            .save(RetentionRule::new(
                rule_type,
                project_id,
                data_storage_name,
                retention_days,
            ))
            .await
            .expect("Failed to seed rule")
    }

    /// Drain the monitor until `expected` results have been collected
    pub async fn drain(&mut self, expected: usize) -> Vec<WorkerResult> {
        let mut results = Vec::new();
        for _ in 0..500 {
            if results.len() >= expected {
                break;
            }
            results.extend(self.monitor.get_worker_results().await);
        }
        assert_eq!(results.len(), expected, "monitor did not drain every worker");
        results
    }
}
