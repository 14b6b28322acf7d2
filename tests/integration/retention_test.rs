//! Integration tests for dataset and user retention flows.

use sdrs_core::error::ErrorKind;
use sdrs_entity::rule::RetentionRuleType;
use sdrs_service::RetentionJobRepository;
use sdrs_worker::WorkerStatus;
use sdrs_worker::jobs::{DatasetRuleWorker, UserRuleWorker};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_dataset_worker_creates_one_job_per_bucket() {
    let mut app = TestApp::new();
    let first = app
        .seed_rule(RetentionRuleType::Dataset, "project", "gs://logs/web", 30)
        .await;
    app.seed_rule(RetentionRuleType::Dataset, "project", "gs://logs/api", 60)
        .await;
    app.seed_rule(RetentionRuleType::Dataset, "project", "gs://events/clicks", 10)
        .await;

    app.manager
        .submit_job(Box::new(DatasetRuleWorker::new(app.service.clone(), "project")))
        .unwrap();
    let results = app.drain(1).await;
    assert_eq!(results[0].status, WorkerStatus::Success);

    let transfer_jobs = app.client.jobs();
    assert_eq!(transfer_jobs.len(), 2);
    for job in &transfer_jobs {
        assert_eq!(job.spec.destination_bucket, format!("{}shadow", job.spec.source_bucket));
        assert!(!job.spec.include_prefixes.is_empty());
    }

    let logs = transfer_jobs
        .iter()
        .find(|j| j.spec.source_bucket == "logs")
        .unwrap();
    assert!(logs.spec.include_prefixes.iter().any(|p| p.starts_with("web/")));
    assert!(logs.spec.include_prefixes.iter().any(|p| p.starts_with("api/")));

    let stored = app.jobs.find_by_rule(first.id.unwrap()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].retention_rule_type, RetentionRuleType::Dataset);
}

#[tokio::test]
async fn test_user_request_on_dataset_folder() {
    let mut app = TestApp::new();

    app.manager
        .submit_job(Box::new(UserRuleWorker::new(
            app.service.clone(),
            "project",
            "gs://bucket/dataset/",
        )))
        .unwrap();
    let results = app.drain(1).await;
    assert_eq!(results[0].status, WorkerStatus::Success);

    let jobs = app.client.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].spec.include_prefixes, ["dataset/"]);
    assert!(jobs[0].description.starts_with("Rule User gs://bucket/dataset/ "));
}

#[tokio::test]
async fn test_user_request_on_bucket_root_fails_without_calls() {
    let mut app = TestApp::new();

    let err = app
        .service
        .execute_user_rule("project", "gs://bucket/file.avro")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidTarget);

    app.manager
        .submit_job(Box::new(UserRuleWorker::new(
            app.service.clone(),
            "project",
            "gs://bucket/file.avro",
        )))
        .unwrap();
    let results = app.drain(1).await;
    assert_eq!(results[0].status, WorkerStatus::Failure);
    assert!(results[0].cause.as_deref().unwrap().contains("INVALID_TARGET"));
    assert_eq!(app.client.total_calls(), 0);
}
