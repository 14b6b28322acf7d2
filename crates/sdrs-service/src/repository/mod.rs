//! Persistence collaborators for rules and jobs.

pub mod memory;

pub use memory::{InMemoryJobRepository, InMemoryRuleRepository};

use async_trait::async_trait;

use sdrs_core::result::AppResult;
use sdrs_entity::job::RetentionJob;
use sdrs_entity::rule::RetentionRule;

/// Read and write access to retention rules.
#[async_trait]
pub trait RetentionRuleRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Active dataset rules of a project.
    async fn find_active_dataset_rules(&self, project_id: &str) -> AppResult<Vec<RetentionRule>>;

    /// Active dataset rules of every project.
    async fn find_all_active_dataset_rules(&self) -> AppResult<Vec<RetentionRule>>;

    /// Projects that have at least one active dataset rule, sorted.
    async fn find_projects_with_dataset_rules(&self) -> AppResult<Vec<String>>;

    /// The active global rule, or the most recent inactive one.
    async fn find_global_rule(&self) -> AppResult<Option<RetentionRule>>;

    /// Look a rule up by id.
    async fn find_by_id(&self, id: i32) -> AppResult<Option<RetentionRule>>;

    /// Insert a rule without an id, or replace the stored one.
    async fn save(&self, rule: RetentionRule) -> AppResult<RetentionRule>;
}

/// Read and write access to retention jobs.
#[async_trait]
pub trait RetentionJobRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Jobs created for a rule.
    async fn find_by_rule(&self, rule_id: i32) -> AppResult<Vec<RetentionJob>>;

    /// Insert jobs without an id and replace the others.
    async fn save_all(&self, jobs: Vec<RetentionJob>) -> AppResult<Vec<RetentionJob>>;
}
