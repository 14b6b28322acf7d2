//! Retention orchestration: load rules, run the executor, persist jobs.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_core::validation::{ValidationResult, validate_retention_period};
use sdrs_entity::job::RetentionJob;
use sdrs_entity::rule::{RetentionRule, RetentionRuleType};

use crate::repository::{RetentionJobRepository, RetentionRuleRepository};

use super::executor::RetentionRuleExecutor;
use super::path::{PrefixMapKey, bucket_name, prefix_map_key};

/// Request to create a retention rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRetentionRuleRequest {
    /// Rule scope.
    #[serde(rename = "type")]
    pub rule_type: RetentionRuleType,
    /// Owning project; a placeholder for global rules.
    pub project_id: String,
    /// Human-readable dataset name.
    #[serde(default)]
    pub dataset_name: Option<String>,
    /// `gs://bucket/dataset` for dataset rules.
    pub data_storage_name: String,
    /// Days before objects are moved to the shadow bucket.
    pub retention_period_in_days: i32,
}

/// Runs retention rules end to end.
#[derive(Debug, Clone)]
pub struct RetentionService {
    /// Rule store.
    rules: Arc<dyn RetentionRuleRepository>,
    /// Job store.
    jobs: Arc<dyn RetentionJobRepository>,
    /// Transfer job planner.
    executor: Arc<RetentionRuleExecutor>,
    /// UTC hour new recurring jobs start at.
    schedule_hour: u32,
}

impl RetentionService {
    /// Creates a new retention service.
    pub fn new(
        rules: Arc<dyn RetentionRuleRepository>,
        jobs: Arc<dyn RetentionJobRepository>,
        executor: Arc<RetentionRuleExecutor>,
        schedule_hour: u32,
    ) -> Self {
        Self {
            rules,
            jobs,
            executor,
            schedule_hour,
        }
    }

    /// Validate and store a new rule at version 1.
    ///
    /// Only one active global rule may exist at a time.
    pub async fn create_rule(&self, req: CreateRetentionRuleRequest) -> AppResult<RetentionRule> {
        let rule = RetentionRule {
            dataset_name: req.dataset_name,
            ..RetentionRule::new(
                req.rule_type,
                req.project_id,
                req.data_storage_name,
                req.retention_period_in_days,
            )
        };
        rule.validate().into_result()?;

        if rule.rule_type == RetentionRuleType::Global {
            let active = self.rules.find_global_rule().await?.filter(|r| r.is_active);
            if let Some(existing) = active {
                return Err(AppError::validation(format!(
                    "An active global retention rule already exists (id {})",
                    or_unsaved(existing.id)
                )));
            }
        }

        let saved = self.rules.save(rule).await?;
        info!(
            rule_id = saved.id,
            rule_type = %saved.rule_type,
            data_storage_name = %saved.data_storage_name,
            "Created retention rule"
        );
        Ok(saved)
    }

    /// Change the retention period of a stored rule, bumping its version.
    pub async fn update_rule(
        &self,
        rule_id: i32,
        retention_period_in_days: i32,
    ) -> AppResult<RetentionRule> {
        let mut rule = self
            .rules
            .find_by_id(rule_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Retention rule {rule_id} not found")))?;
        validate_retention_period(Some(retention_period_in_days)).into_result()?;

        rule.update_retention(retention_period_in_days);
        let saved = self.rules.save(rule).await?;
        info!(
            rule_id,
            version = saved.version,
            retention_period_in_days,
            "Updated retention rule"
        );
        Ok(saved)
    }

    /// Run every active dataset rule of a project.
    pub async fn execute_dataset_rules(&self, project_id: &str) -> AppResult<Vec<RetentionJob>> {
        let rules = self.rules.find_active_dataset_rules(project_id).await?;
        if rules.is_empty() {
            debug!(project_id, "No active dataset rules");
            return Ok(Vec::new());
        }
        ValidationResult::compose(rules.iter().map(RetentionRule::validate)).into_result()?;

        let jobs = self.executor.execute_dataset_rule(&rules, project_id).await?;
        let saved = self.jobs.save_all(jobs).await?;
        info!(project_id, rules = rules.len(), jobs = saved.len(), "Executed dataset rules");
        Ok(saved)
    }

    /// Immediately move everything under the folder holding `target`.
    pub async fn execute_user_rule(
        &self,
        project_id: &str,
        target: &str,
    ) -> AppResult<Vec<RetentionJob>> {
        let rule = RetentionRule::user(project_id, target);
        rule.validate().into_result()?;

        let jobs = self
            .executor
            .execute_dataset_rule(std::slice::from_ref(&rule), project_id)
            .await?;
        let saved = self.jobs.save_all(jobs).await?;
        info!(project_id, target, "Executed user retention request");
        Ok(saved)
    }

    /// Create the global jobs on first run, then keep them up to date.
    ///
    /// Returns the jobs that were created or changed.
    pub async fn apply_global_rule(&self) -> AppResult<Vec<RetentionJob>> {
        let rule = self.global_rule().await?;
        if !rule.is_active {
            return Err(AppError::validation("Global retention rule is not active"));
        }
        rule.validate().into_result()?;

        let rule_id = rule
            .id
            .ok_or_else(|| AppError::internal("Stored global rule has no id"))?;
        let datasets = self.rules.find_all_active_dataset_rules().await?;
        let existing = self.jobs.find_by_rule(rule_id).await?;

        let mut changed = if existing.is_empty() {
            Vec::new()
        } else {
            self.executor
                .update_default_rule(&existing, &rule, &datasets)
                .await?
        };

        let covered: BTreeSet<PrefixMapKey> = existing.iter().map(job_key).collect();
        let uncovered: Vec<RetentionRule> = datasets
            .iter()
            .filter(|r| !covered.contains(&rule_key(r)))
            .cloned()
            .collect();
        if !uncovered.is_empty() {
            let scheduled = self.next_schedule_time(Utc::now());
            changed.extend(
                self.executor
                    .execute_default_rule(&rule, &uncovered, scheduled)
                    .await?,
            );
        }

        let saved = self.jobs.save_all(changed).await?;
        info!(rule_id, jobs = saved.len(), "Applied global retention rule");
        Ok(saved)
    }

    /// Disable every global job and deactivate the global rule.
    pub async fn cancel_global_rule(&self) -> AppResult<Vec<RetentionJob>> {
        let mut rule = self.global_rule().await?;
        let rule_id = rule
            .id
            .ok_or_else(|| AppError::internal("Stored global rule has no id"))?;

        let existing = self.jobs.find_by_rule(rule_id).await?;
        let cancelled = self.executor.cancel_default_jobs(&existing, &rule).await?;
        let saved = self.jobs.save_all(cancelled).await?;

        rule.deactivate();
        self.rules.save(rule).await?;
        info!(rule_id, jobs = saved.len(), "Cancelled global retention rule");
        Ok(saved)
    }

    /// Projects that currently have active dataset rules.
    pub async fn projects_with_dataset_rules(&self) -> AppResult<Vec<String>> {
        self.rules.find_projects_with_dataset_rules().await
    }

    /// Next occurrence of the configured hour, strictly after `now`.
    pub fn next_schedule_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now
            .date_naive()
            .and_hms_opt(self.schedule_hour, 0, 0)
            .map(|t| Utc.from_utc_datetime(&t))
            .unwrap_or(now);
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    async fn global_rule(&self) -> AppResult<RetentionRule> {
        self.rules
            .find_global_rule()
            .await?
            .ok_or_else(|| AppError::not_found("No global retention rule is defined"))
    }
}

fn or_unsaved(id: Option<i32>) -> String {
    id.map_or_else(|| "unsaved".to_string(), |id| id.to_string())
}

fn job_key(job: &RetentionJob) -> PrefixMapKey {
    prefix_map_key(
        &job.retention_rule_project_id,
        bucket_name(&job.retention_rule_data_storage_name),
    )
}

fn rule_key(rule: &RetentionRule) -> PrefixMapKey {
    prefix_map_key(&rule.project_id, bucket_name(&rule.data_storage_name))
}
