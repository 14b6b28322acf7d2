//! Retention rule entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sdrs_core::validation::{
    ValidationResult, validate_data_storage_name, validate_project_id, validate_retention_period,
};

use super::rule_type::RetentionRuleType;

/// A retention policy.
///
/// Rules with neither `id` nor `version` are ad-hoc: they were built for a
/// single user-triggered execution and have no stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRule {
    /// Persistence identifier (`None` for ad-hoc rules).
    pub id: Option<i32>,
    /// Scope of the rule.
    #[serde(rename = "type")]
    pub rule_type: RetentionRuleType,
    /// Project owning the data. Global rules carry a placeholder project.
    pub project_id: String,
    /// Human-readable dataset name.
    #[serde(default)]
    pub dataset_name: Option<String>,
    /// `gs://bucket/dataset[/...]`; a bare bucket for global rules.
    pub data_storage_name: String,
    /// Days an object may live before it is moved to the shadow bucket.
    pub retention_period_in_days: i32,
    /// Monotonic revision number (`None` for ad-hoc rules).
    pub version: Option<i32>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
    /// When the rule was last updated.
    pub updated_at: DateTime<Utc>,
}

impl RetentionRule {
    /// Build a fresh, unsaved, active rule at version 1.
    pub fn new(
        rule_type: RetentionRuleType,
        project_id: impl Into<String>,
        data_storage_name: impl Into<String>,
        retention_period_in_days: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            rule_type,
            project_id: project_id.into(),
            dataset_name: None,
            data_storage_name: data_storage_name.into(),
            retention_period_in_days,
            version: Some(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build an ad-hoc rule deleting `target` immediately.
    pub fn user(project_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            version: None,
            ..Self::new(RetentionRuleType::User, project_id, target, 0)
        }
    }

    /// Whether this rule has no stored record behind it.
    pub fn is_ad_hoc(&self) -> bool {
        self.id.is_none() && self.version.is_none()
    }

    /// Apply a new retention period, bumping the version.
    pub fn update_retention(&mut self, retention_period_in_days: i32) {
        self.retention_period_in_days = retention_period_in_days;
        self.version = Some(self.version.unwrap_or(0) + 1);
        self.updated_at = Utc::now();
    }

    /// Soft-disable the rule.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Collect every violation of this rule's invariants.
    pub fn validate(&self) -> ValidationResult {
        let mut partial = vec![validate_retention_period(Some(self.retention_period_in_days))];

        if self.rule_type.targets_dataset() {
            partial.push(validate_data_storage_name(Some(&self.data_storage_name)));
            partial.push(validate_project_id(
                Some(&self.project_id),
                self.rule_type.as_str(),
            ));
        }

        ValidationResult::compose(partial)
    }
}
