//! Translates retention rules into transfer jobs.
//!
//! Dataset and ad-hoc rules become one-shot jobs that move the objects
//! matched by `include_prefixes` into the shadow bucket. The global rule
//! becomes one recurring job per `(project, bucket)` that moves everything
//! older than the retention period, except the datasets that have a rule of
//! their own.
//!
//! Every call plans all of its jobs before talking to the transfer service,
//! so validation faults never leave a partial set of jobs behind. Buckets are
//! then processed one at a time and the first transfer fault aborts the call.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use tracing::{debug, info, warn};

use sdrs_core::config::TransferConfig;
use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_core::traits::transfer::{
    CreateRecurringTransferJob, CreateTransferJob, TransferClient, TransferJob, TransferJobStatus,
    TransferSpec, retention_duration,
};
use sdrs_core::validation::STORAGE_PREFIX;
use sdrs_entity::job::RetentionJob;
use sdrs_entity::rule::{RetentionRule, RetentionRuleType};

use super::path::{
    PrefixMap, bucket_name, dataset_path, parent_prefix, prefix_map, prefix_map_key,
};
use super::prefix::PrefixGenerator;

/// A one-shot job to create for a bucket.
#[derive(Debug)]
struct DatasetPlan<'a> {
    bucket: String,
    rule: &'a RetentionRule,
    include_prefixes: BTreeSet<String>,
}

/// A recurring job to create for a `(project, bucket)` pair.
#[derive(Debug)]
struct DefaultPlan {
    project_id: String,
    bucket: String,
    exclude_prefixes: BTreeSet<String>,
}

/// Builds, updates, and cancels transfer jobs for retention rules.
#[derive(Debug, Clone)]
pub struct RetentionRuleExecutor {
    /// Transfer service collaborator.
    client: Arc<dyn TransferClient>,
    /// Shadow suffix, prefix ceiling, lookback, and default excludes.
    config: TransferConfig,
    /// Dataset prefix generator.
    prefixes: PrefixGenerator,
}

impl RetentionRuleExecutor {
    /// Create an executor over the given transfer client.
    pub fn new(client: Arc<dyn TransferClient>, config: TransferConfig) -> Self {
        let prefixes = PrefixGenerator::new(config.prefix_granularity);
        Self {
            client,
            config,
            prefixes,
        }
    }

    /// Create one-shot jobs for dataset and ad-hoc rules, one per bucket.
    pub async fn execute_dataset_rule(
        &self,
        dataset_rules: &[RetentionRule],
        project_id: &str,
    ) -> AppResult<Vec<RetentionJob>> {
        self.execute_dataset_rule_at(dataset_rules, project_id, Utc::now())
            .await
    }

    /// Same as [`execute_dataset_rule`](Self::execute_dataset_rule) with an
    /// explicit execution time.
    pub async fn execute_dataset_rule_at(
        &self,
        dataset_rules: &[RetentionRule],
        project_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<RetentionJob>> {
        let plans = self.plan_dataset_jobs(dataset_rules, now)?;
        let mut jobs = Vec::with_capacity(plans.len());

        for plan in plans {
            let request = CreateTransferJob {
                project_id: project_id.to_string(),
                destination_bucket: self.shadow_bucket(&plan.bucket),
                source_bucket: plan.bucket,
                include_prefixes: plan.include_prefixes.into_iter().collect(),
                description: build_description(plan.rule, now),
                schedule_time: now,
            };
            let created = self.client.create_job(request).await?;

            info!(
                job_name = %created.name,
                project_id = %created.project_id,
                bucket = %created.spec.source_bucket,
                prefixes = created.spec.include_prefixes.len(),
                "Created dataset transfer job"
            );
            jobs.push(RetentionJob::for_rule(created.name, plan.rule));
        }

        Ok(jobs)
    }

    /// Create one recurring job per `(project, bucket)` for the global rule.
    pub async fn execute_default_rule(
        &self,
        default_rule: &RetentionRule,
        bucket_dataset_rules: &[RetentionRule],
        scheduled_time: DateTime<Utc>,
    ) -> AppResult<Vec<RetentionJob>> {
        ensure_bucket_rule(default_rule)?;
        let plans = self.plan_default_jobs(&prefix_map(bucket_dataset_rules))?;
        let mut jobs = Vec::with_capacity(plans.len());

        for plan in plans {
            let request = CreateRecurringTransferJob {
                project_id: plan.project_id.clone(),
                destination_bucket: self.shadow_bucket(&plan.bucket),
                source_bucket: plan.bucket.clone(),
                exclude_prefixes: plan.exclude_prefixes.into_iter().collect(),
                description: build_description(default_rule, scheduled_time),
                schedule_time: scheduled_time,
                retention_days: default_rule.retention_period_in_days,
            };
            let created = self.client.create_recurring_job(request).await?;

            info!(
                job_name = %created.name,
                project_id = %plan.project_id,
                bucket = %plan.bucket,
                "Created global transfer job"
            );
            jobs.push(RetentionJob {
                retention_rule_project_id: plan.project_id,
                retention_rule_data_storage_name: format!("{STORAGE_PREFIX}{}", plan.bucket),
                ..RetentionJob::for_rule(created.name, default_rule)
            });
        }

        Ok(jobs)
    }

    /// Bring existing global jobs in line with the rule and dataset rules.
    ///
    /// Only jobs that actually changed are returned.
    pub async fn update_default_rule(
        &self,
        existing_jobs: &[RetentionJob],
        default_rule: &RetentionRule,
        bucket_dataset_rules: &[RetentionRule],
    ) -> AppResult<Vec<RetentionJob>> {
        ensure_bucket_rule(default_rule)?;
        let map = prefix_map(bucket_dataset_rules);

        let mut plans = Vec::with_capacity(existing_jobs.len());
        for job in existing_jobs {
            let key = prefix_map_key(
                &job.retention_rule_project_id,
                bucket_name(&job.retention_rule_data_storage_name),
            );
            plans.push((job, self.exclude_prefixes(map.get(&key))?));
        }

        let desired_retention = retention_duration(default_rule.retention_period_in_days);
        let now = Utc::now();
        let mut updated = Vec::new();

        for (job, exclude_prefixes) in plans {
            let current = self.get_global_transfer_job(job, default_rule).await?;

            let retention_changed =
                current.spec.min_retention_duration.as_deref() != Some(desired_retention.as_str());
            let prefixes_changed =
                !same_prefixes(&current.spec.exclude_prefixes, &exclude_prefixes);
            if !retention_changed && !prefixes_changed {
                debug!(job_name = %current.name, "Global transfer job is up to date");
                continue;
            }

            let replacement = TransferJob {
                description: build_description(default_rule, now),
                spec: TransferSpec {
                    exclude_prefixes: exclude_prefixes.into_iter().collect(),
                    min_retention_duration: Some(desired_retention.clone()),
                    ..current.spec.clone()
                },
                ..current.clone()
            };
            let result = self
                .client
                .update_job(&replacement, &current.name, &current.project_id)
                .await?;

            info!(
                job_name = %result.name,
                retention_changed,
                prefixes_changed,
                "Updated global transfer job"
            );
            updated.push(RetentionJob::for_rule(result.name, default_rule).with_linkage_of(job));
        }

        Ok(updated)
    }

    /// Disable the transfer jobs behind `jobs`, keeping their definition.
    pub async fn cancel_default_jobs(
        &self,
        jobs: &[RetentionJob],
        default_rule: &RetentionRule,
    ) -> AppResult<Vec<RetentionJob>> {
        ensure_bucket_rule(default_rule)?;
        let mut cancelled = Vec::with_capacity(jobs.len());

        for job in jobs {
            let current = self.get_global_transfer_job(job, default_rule).await?;
            let disabled = TransferJob {
                status: TransferJobStatus::Disabled,
                ..current.clone()
            };
            let result = self
                .client
                .update_job(&disabled, &current.name, &current.project_id)
                .await?;

            info!(job_name = %result.name, "Disabled global transfer job");
            cancelled.push(RetentionJob::for_rule(result.name, default_rule).with_linkage_of(job));
        }

        Ok(cancelled)
    }

    async fn get_global_transfer_job(
        &self,
        job: &RetentionJob,
        rule: &RetentionRule,
    ) -> AppResult<TransferJob> {
        ensure_bucket_rule(rule)?;
        self.client
            .get_job(&job.retention_rule_project_id, &job.name)
            .await?
            .ok_or_else(|| {
                AppError::external_job_not_found(format!(
                    "Transfer job {} not found in project {}",
                    job.name, job.retention_rule_project_id
                ))
            })
    }

    fn plan_dataset_jobs<'a>(
        &self,
        dataset_rules: &'a [RetentionRule],
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DatasetPlan<'a>>> {
        let mut by_bucket: BTreeMap<&str, Vec<&'a RetentionRule>> = BTreeMap::new();
        for rule in dataset_rules {
            by_bucket
                .entry(bucket_name(&rule.data_storage_name))
                .or_default()
                .push(rule);
        }

        let mut plans = Vec::with_capacity(by_bucket.len());
        for (bucket, rules) in by_bucket {
            let mut include_prefixes = BTreeSet::new();
            for rule in &rules {
                include_prefixes.extend(self.include_prefixes(rule, now)?);
            }

            if include_prefixes.is_empty() {
                warn!(bucket, "No prefixes old enough to move; skipping bucket");
                continue;
            }
            self.check_prefix_count(include_prefixes.len(), bucket)?;

            plans.push(DatasetPlan {
                bucket: bucket.to_string(),
                rule: rules[0],
                include_prefixes,
            });
        }
        Ok(plans)
    }

    fn include_prefixes(
        &self,
        rule: &RetentionRule,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<String>> {
        let path = dataset_path(&rule.data_storage_name);
        match rule.rule_type {
            RetentionRuleType::Global => Err(AppError::invalid_rule_type(
                "GLOBAL retention rules cannot be executed as dataset rules",
            )),
            RetentionRuleType::User => {
                let prefix = parent_prefix(path);
                if prefix.is_empty() {
                    return Err(AppError::invalid_target(format!(
                        "Refusing to delete the root of bucket {}",
                        bucket_name(&rule.data_storage_name)
                    )));
                }
                Ok(vec![prefix.to_string()])
            }
            RetentionRuleType::Dataset => {
                if path.trim_matches('/').is_empty() {
                    return Err(AppError::invalid_target(format!(
                        "Dataset rule {} targets the root of a bucket",
                        rule.data_storage_name
                    )));
                }
                let start = days_before(now, self.config.max_lookback_days)?;
                let end = days_before(now, i64::from(rule.retention_period_in_days))?;
                Ok(self.prefixes.generate(path, start, end))
            }
        }
    }

    fn plan_default_jobs(&self, map: &PrefixMap) -> AppResult<Vec<DefaultPlan>> {
        let mut plans = Vec::with_capacity(map.len());
        for ((project_id, bucket), paths) in map {
            if project_id.is_empty() || *project_id == self.config.default_project_id {
                return Err(AppError::validation(format!(
                    "Transfer job could not be created. No projectId found for bucket {bucket}"
                )));
            }
            plans.push(DefaultPlan {
                project_id: project_id.clone(),
                bucket: bucket.clone(),
                exclude_prefixes: self.exclude_prefixes(Some(paths))?,
            });
        }
        Ok(plans)
    }

    /// Dataset paths to exclude, or the default list when there are none.
    fn exclude_prefixes(&self, paths: Option<&BTreeSet<String>>) -> AppResult<BTreeSet<String>> {
        let prefixes = match paths {
            Some(paths) if !paths.is_empty() => paths.clone(),
            _ => self
                .config
                .default_exclude_prefixes
                .iter()
                .cloned()
                .collect(),
        };
        self.check_prefix_count(prefixes.len(), "exclude list")?;
        Ok(prefixes)
    }

    fn check_prefix_count(&self, count: usize, scope: &str) -> AppResult<()> {
        if count > self.config.max_prefix_count {
            return Err(AppError::too_many_prefixes(format!(
                "{scope} has {count} prefixes, more than the limit of {}",
                self.config.max_prefix_count
            )));
        }
        Ok(())
    }

    fn shadow_bucket(&self, bucket: &str) -> String {
        format!("{bucket}{}", self.config.shadow_suffix)
    }
}

fn days_before(now: DateTime<Utc>, days: i64) -> AppResult<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| {
            AppError::validation(format!("Retention window of {days} days is out of range"))
        })
}

fn ensure_bucket_rule(rule: &RetentionRule) -> AppResult<()> {
    match rule.rule_type {
        RetentionRuleType::Dataset => Err(AppError::invalid_rule_type(
            "DATASET retention rule type is invalid for this function",
        )),
        RetentionRuleType::Global | RetentionRuleType::User => Ok(()),
    }
}

/// Transfer job description for a rule executed at `time`.
///
/// `Rule <id> <version> <time>`, or `Rule User <dataStorageName> <time>` for
/// ad-hoc rules.
pub fn build_description(rule: &RetentionRule, time: DateTime<Utc>) -> String {
    let time = time.to_rfc3339_opts(SecondsFormat::Secs, true);
    if rule.is_ad_hoc() {
        format!("Rule User {} {time}", rule.data_storage_name)
    } else {
        format!("Rule {} {} {time}", or_null(rule.id), or_null(rule.version))
    }
}

fn or_null(value: Option<i32>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

/// Whether `current` holds exactly the prefixes in `desired`, in any order.
pub fn same_prefixes(current: &[String], desired: &BTreeSet<String>) -> bool {
    let mut sorted = current.to_vec();
    sorted.sort();
    sorted.iter().eq(desired.iter())
}
