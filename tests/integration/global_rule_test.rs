//! Integration tests for the global (default) retention rule.

use sdrs_core::error::ErrorKind;
use sdrs_core::traits::transfer::TransferJobStatus;
use sdrs_entity::rule::RetentionRuleType;
use sdrs_worker::WorkerStatus;
use sdrs_worker::jobs::{GlobalRuleAction, GlobalRuleWorker};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_apply_is_idempotent() {
    let app = TestApp::new();
    app.seed_rule(RetentionRuleType::Global, "global-default", "gs://global", 30)
        .await;
    app.seed_rule(RetentionRuleType::Dataset, "p1", "gs://b1/a", 10)
        .await;
    app.seed_rule(RetentionRuleType::Dataset, "p1", "gs://b1/b", 10)
        .await;

    let created = app.service.apply_global_rule().await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].retention_rule_project_id, "p1");
    assert_eq!(created[0].retention_rule_data_storage_name, "gs://b1");

    let job = app.client.peek("p1", &created[0].name).unwrap();
    assert_eq!(job.spec.exclude_prefixes, ["a/", "b/"]);
    assert_eq!(job.spec.min_retention_duration.as_deref(), Some("2592000s"));

    let calls = app.client.update_calls();
    assert!(app.service.apply_global_rule().await.unwrap().is_empty());
    assert_eq!(app.client.update_calls(), calls);
}

#[tokio::test]
async fn test_too_many_excludes_fail_before_any_call() {
    let app = TestApp::new();
    app.seed_rule(RetentionRuleType::Global, "global-default", "gs://global", 30)
        .await;
    for i in 0..1001 {
        app.seed_rule(RetentionRuleType::Dataset, "p", &format!("gs://wide/d{i}"), 10)
            .await;
    }

    let err = app.service.apply_global_rule().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TooManyPrefixes);
    assert_eq!(app.client.total_calls(), 0);
}

#[tokio::test]
async fn test_cancel_then_reapply() {
    let mut app = TestApp::new();
    app.seed_rule(RetentionRuleType::Global, "global-default", "gs://global", 30)
        .await;
    app.seed_rule(RetentionRuleType::Dataset, "p1", "gs://b1/a", 10)
        .await;

    app.manager
        .submit_job(Box::new(GlobalRuleWorker::new(
            app.service.clone(),
            GlobalRuleAction::Apply,
        )))
        .unwrap();
    assert_eq!(app.drain(1).await[0].status, WorkerStatus::Success);
    let before = app.client.jobs().remove(0);

    app.manager
        .submit_job(Box::new(GlobalRuleWorker::new(
            app.service.clone(),
            GlobalRuleAction::Cancel,
        )))
        .unwrap();
    assert_eq!(app.drain(1).await[0].status, WorkerStatus::Success);

    let after = app.client.peek("p1", &before.name).unwrap();
    assert_eq!(after.status, TransferJobStatus::Disabled);
    assert_eq!(after.spec, before.spec);
    assert_eq!(after.description, before.description);

    app.manager
        .submit_job(Box::new(GlobalRuleWorker::new(
            app.service.clone(),
            GlobalRuleAction::Apply,
        )))
        .unwrap();
    let results = app.drain(1).await;
    assert_eq!(results[0].status, WorkerStatus::Failure);
    assert_eq!(app.manager.active_worker_count(), 0);
}
