//! Retention job entity model.

use serde::{Deserialize, Serialize};

use crate::rule::{RetentionRule, RetentionRuleType};

/// The durable link between a retention rule and a transfer job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionJob {
    /// Persistence identifier (`None` until first saved).
    pub id: Option<i32>,
    /// Transfer job handle (`transferJobs/...`).
    pub name: String,
    /// Rule the job enacts (`None` for ad-hoc executions).
    pub retention_rule_id: Option<i32>,
    /// Project the transfer job runs in.
    pub retention_rule_project_id: String,
    /// Storage path the transfer job covers.
    pub retention_rule_data_storage_name: String,
    /// Type of the enacted rule.
    pub retention_rule_type: RetentionRuleType,
    /// Version of the enacted rule at the time of execution.
    pub retention_rule_version: Option<i32>,
}

impl RetentionJob {
    /// Link a transfer job to the rule it was created for.
    pub fn for_rule(name: impl Into<String>, rule: &RetentionRule) -> Self {
        Self {
            id: None,
            name: name.into(),
            retention_rule_id: rule.id,
            retention_rule_project_id: rule.project_id.clone(),
            retention_rule_data_storage_name: rule.data_storage_name.clone(),
            retention_rule_type: rule.rule_type,
            retention_rule_version: rule.version,
        }
    }

    /// Copy the persistence id and project/storage linkage of `existing`.
    pub fn with_linkage_of(mut self, existing: &RetentionJob) -> Self {
        self.id = existing.id;
        self.retention_rule_project_id = existing.retention_rule_project_id.clone();
        self.retention_rule_data_storage_name = existing.retention_rule_data_storage_name.clone();
        self
    }
}
