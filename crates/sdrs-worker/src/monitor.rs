//! Completion monitor for the job manager.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time;

use crate::manager::shutdown_signalled;
use crate::worker::{WorkerResult, WorkerStatus};

/// Drains finished workers and keeps the active worker count honest.
///
/// The monitor holds no business logic: it decrements the count once per
/// result, logs the outcome, and never alters the result.
#[derive(Debug)]
pub struct JobManagerMonitor {
    /// Results sent by finished workers.
    completed: mpsc::UnboundedReceiver<WorkerResult>,
    /// Counter shared with the manager.
    active_workers: Arc<AtomicUsize>,
    /// How long one drain pass waits for the first result.
    poll_interval: Duration,
    /// Raised by the manager on shutdown.
    shutdown: watch::Receiver<bool>,
    /// Set once every sender is gone.
    closed: bool,
}

impl JobManagerMonitor {
    pub(crate) fn new(
        completed: mpsc::UnboundedReceiver<WorkerResult>,
        active_workers: Arc<AtomicUsize>,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            completed,
            active_workers,
            poll_interval,
            shutdown,
            closed: false,
        }
    }

    /// Poll until shutdown, or until the manager and all workers are gone.
    pub async fn run(mut self) {
        tracing::info!("Job manager monitor started");

        while !self.closed {
            tokio::select! {
                _ = shutdown_signalled(self.shutdown.clone()) => {
                    tracing::info!("Job manager monitor received shutdown signal");
                    break;
                }
                _ = self.get_worker_results() => {}
            }
        }

        tracing::info!("Job manager monitor stopped");
    }

    /// Drain every result available in one pass.
    ///
    /// Waits up to the poll interval for the first result, then takes
    /// whatever else is already queued.
    pub async fn get_worker_results(&mut self) -> Vec<WorkerResult> {
        let mut results = Vec::new();

        match time::timeout(self.poll_interval, self.completed.recv()).await {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {
                self.closed = true;
                return results;
            }
            Err(_) => return results,
        }
        while let Ok(result) = self.completed.try_recv() {
            results.push(result);
        }

        for result in &results {
            self.active_workers.fetch_sub(1, Ordering::SeqCst);
            match result.status {
                WorkerStatus::Failure => tracing::error!(
                    "Worker '{}' ({}) failed: {}",
                    result.name,
                    result.id,
                    result.cause.as_deref().unwrap_or("no cause recorded")
                ),
                WorkerStatus::Success | WorkerStatus::Pending => tracing::info!(
                    "Worker '{}' ({}) completed with status {}",
                    result.name,
                    result.id,
                    result.status
                ),
            }
        }

        tracing::debug!(
            "Drained {} workers, {} still active",
            results.len(),
            self.active_workers.load(Ordering::SeqCst)
        );
        results
    }
}
