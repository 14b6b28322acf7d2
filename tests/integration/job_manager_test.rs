//! Integration tests for the job manager and its monitor.

use async_trait::async_trait;
use sdrs_core::config::WorkerConfig;
use sdrs_worker::{JobManager, Worker, WorkerError, WorkerResult, WorkerStatus};

use crate::helpers::TestApp;

#[derive(Debug)]
struct Flaky {
    fail: bool,
}

#[async_trait]
impl Worker for Flaky {
    fn name(&self) -> String {
        format!("flaky-{}", self.fail)
    }

    async fn do_work(&mut self, _result: &mut WorkerResult) -> Result<(), WorkerError> {
        if self.fail {
            Err(WorkerError::Failed("unlucky".into()))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_active_count_tracks_every_worker() {
    let mut app = TestApp::new();

    for i in 0..10 {
        app.manager
            .submit_job(Box::new(Flaky { fail: i % 3 == 0 }))
            .unwrap();
        assert_eq!(app.manager.active_worker_count(), i + 1);
    }

    let results = app.drain(10).await;
    assert_eq!(app.manager.active_worker_count(), 0);

    let failures = results
        .iter()
        .filter(|r| r.status == WorkerStatus::Failure)
        .count();
    assert_eq!(failures, 4);
    assert!(results.iter().all(|r| r.status != WorkerStatus::Pending));
}

#[tokio::test]
async fn test_started_manager_drains_in_background() {
    let manager = JobManager::start(WorkerConfig {
        monitor_poll_interval_ms: 10,
        ..WorkerConfig::default()
    });
    for _ in 0..5 {
        manager.submit_job(Box::new(Flaky { fail: false })).unwrap();
    }

    for _ in 0..200 {
        if manager.active_worker_count() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(manager.active_worker_count(), 0);

    manager.shut_down_now();
    assert!(manager.submit_job(Box::new(Flaky { fail: false })).is_err());
}
