//! Process-local repositories.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;
use sdrs_entity::job::RetentionJob;
use sdrs_entity::rule::{RetentionRule, RetentionRuleType};

use super::{RetentionJobRepository, RetentionRuleRepository};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn reserve_id(&mut self, id: Option<i32>) -> i32 {
        match id {
            Some(id) => {
                self.last_id = self.last_id.max(id);
                id
            }
            None => self.next_id(),
        }
    }
}

/// Rules held in memory, ids assigned from 1.
#[derive(Debug, Default)]
pub struct InMemoryRuleRepository {
    table: RwLock<Table<RetentionRule>>,
}

impl InMemoryRuleRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_active_dataset(rule: &RetentionRule) -> bool {
    rule.is_active && rule.rule_type == RetentionRuleType::Dataset
}

#[async_trait]
impl RetentionRuleRepository for InMemoryRuleRepository {
    async fn find_active_dataset_rules(&self, project_id: &str) -> AppResult<Vec<RetentionRule>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| is_active_dataset(r) && r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn find_all_active_dataset_rules(&self) -> AppResult<Vec<RetentionRule>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| is_active_dataset(r))
            .cloned()
            .collect())
    }

    async fn find_projects_with_dataset_rules(&self) -> AppResult<Vec<String>> {
        let table = self.table.read().await;
        let projects: BTreeSet<String> = table
            .rows
            .values()
            .filter(|r| is_active_dataset(r))
            .map(|r| r.project_id.clone())
            .collect();
        Ok(projects.into_iter().collect())
    }

    async fn find_global_rule(&self) -> AppResult<Option<RetentionRule>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|r| r.rule_type == RetentionRuleType::Global)
            .max_by_key(|r| (r.is_active, r.id))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<RetentionRule>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save(&self, mut rule: RetentionRule) -> AppResult<RetentionRule> {
        let mut table = self.table.write().await;
        let id = match rule.id {
            Some(id) if table.rows.contains_key(&id) => id,
            Some(id) => return Err(AppError::not_found(format!("Retention rule {id} not found"))),
            None => table.next_id(),
        };
        rule.id = Some(id);
        table.rows.insert(id, rule.clone());
        Ok(rule)
    }
}

/// Jobs held in memory, ids assigned from 1.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    table: RwLock<Table<RetentionJob>>,
}

impl InMemoryJobRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored job, ordered by id.
    pub async fn all(&self) -> Vec<RetentionJob> {
        self.table.read().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl RetentionJobRepository for InMemoryJobRepository {
    async fn find_by_rule(&self, rule_id: i32) -> AppResult<Vec<RetentionJob>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|j| j.retention_rule_id == Some(rule_id))
            .cloned()
            .collect())
    }

    async fn save_all(&self, jobs: Vec<RetentionJob>) -> AppResult<Vec<RetentionJob>> {
        let mut table = self.table.write().await;
        let mut saved = Vec::with_capacity(jobs.len());
        for mut job in jobs {
            let id = table.reserve_id(job.id);
            job.id = Some(id);
            table.rows.insert(id, job.clone());
            saved.push(job);
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdrs_core::error::ErrorKind;

    #[tokio::test]
    async fn test_rule_ids_and_filters() {
        let repo = InMemoryRuleRepository::new();
        let a = repo
            .save(RetentionRule::new(RetentionRuleType::Dataset, "p1", "gs://b/a", 10))
            .await
            .unwrap();
        let mut b = repo
            .save(RetentionRule::new(RetentionRuleType::Dataset, "p2", "gs://b/b", 10))
            .await
            .unwrap();
        repo.save(RetentionRule::new(RetentionRuleType::Global, "global-default", "gs://g", 30))
            .await
            .unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));

        b.deactivate();
        repo.save(b).await.unwrap();

        assert_eq!(repo.find_active_dataset_rules("p1").await.unwrap().len(), 1);
        assert!(repo.find_active_dataset_rules("p2").await.unwrap().is_empty());
        assert_eq!(repo.find_projects_with_dataset_rules().await.unwrap(), ["p1"]);
        assert_eq!(
            repo.find_global_rule().await.unwrap().unwrap().rule_type,
            RetentionRuleType::Global
        );
    }

    #[tokio::test]
    async fn test_active_global_rule_wins() {
        let repo = InMemoryRuleRepository::new();
        let mut old = repo
            .save(RetentionRule::new(RetentionRuleType::Global, "global-default", "gs://g", 30))
            .await
            .unwrap();
        old.deactivate();
        repo.save(old).await.unwrap();
        assert!(!repo.find_global_rule().await.unwrap().unwrap().is_active);

        let current = repo
            .save(RetentionRule::new(RetentionRuleType::Global, "global-default", "gs://g", 60))
            .await
            .unwrap();
        let found = repo.find_global_rule().await.unwrap().unwrap();
        assert_eq!(found.id, current.id);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_save_unknown_id_fails() {
        let repo = InMemoryRuleRepository::new();
        let rule = RetentionRule {
            id: Some(99),
            ..RetentionRule::new(RetentionRuleType::Dataset, "p", "gs://b/d", 1)
        };
        let err = repo.save(rule).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_job_save_all_inserts_and_updates() {
        let repo = InMemoryJobRepository::new();
        let mut rule =
            RetentionRule::new(RetentionRuleType::Global, "global-default", "gs://g", 30);
        rule.id = Some(5);

        let saved = repo
            .save_all(vec![
                RetentionJob::for_rule("transferJobs/a", &rule),
                RetentionJob::for_rule("transferJobs/b", &rule),
            ])
            .await
            .unwrap();
        assert_eq!(saved[1].id, Some(2));

        let renamed = RetentionJob {
            name: "transferJobs/c".into(),
            ..saved[0].clone()
        };
        repo.save_all(vec![renamed]).await.unwrap();

        let jobs = repo.find_by_rule(5).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "transferJobs/c");
    }
}
