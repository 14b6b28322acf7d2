//! Job manager: a bounded pool that runs submitted workers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinHandle;

use sdrs_core::config::WorkerConfig;
use sdrs_core::error::AppError;
use sdrs_core::result::AppResult;

use crate::monitor::JobManagerMonitor;
use crate::worker::{Worker, WorkerResult};

/// Runs workers on tokio tasks, at most `pool_size` at a time.
///
/// Every accepted worker produces exactly one [`WorkerResult`], which is
/// handed to the [`JobManagerMonitor`]. The monitor, not the pool, brings
/// the active worker count back down.
#[derive(Debug)]
pub struct JobManager {
    /// Pool configuration.
    config: WorkerConfig,
    /// One permit per concurrently running worker.
    slots: Arc<Semaphore>,
    /// Submitted workers not yet drained by the monitor.
    active_workers: Arc<AtomicUsize>,
    /// Cleared by shutdown.
    accepting: AtomicBool,
    /// Completion queue feeding the monitor.
    completed: mpsc::UnboundedSender<WorkerResult>,
    /// Shutdown signal shared with workers and the monitor.
    shutdown: watch::Sender<bool>,
    /// Background monitor task, when started.
    monitor_task: Option<JoinHandle<()>>,
}

impl JobManager {
    /// Create a manager and the monitor that drains it, without starting
    /// the monitor.
    pub fn new(config: WorkerConfig) -> (Self, JobManagerMonitor) {
        let active_workers = Arc::new(AtomicUsize::new(0));
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let monitor = JobManagerMonitor::new(
            completed_rx,
            Arc::clone(&active_workers),
            Duration::from_millis(config.monitor_poll_interval_ms),
            shutdown_rx,
        );

        let manager = Self {
            slots: Arc::new(Semaphore::new(config.pool_size)),
            config,
            active_workers,
            accepting: AtomicBool::new(true),
            completed: completed_tx,
            shutdown: shutdown_tx,
            monitor_task: None,
        };
        (manager, monitor)
    }

    /// Create a manager with its monitor running in the background.
    pub fn start(config: WorkerConfig) -> Self {
        let (mut manager, monitor) = Self::new(config);
        manager.monitor_task = Some(tokio::spawn(monitor.run()));

        tracing::info!(
            "Job manager started with pool_size={}, queue_capacity={}, poll_interval={}ms",
            manager.config.pool_size,
            manager.config.queue_capacity,
            manager.config.monitor_poll_interval_ms
        );
        manager
    }

    /// Hand a worker to the pool. Never waits for the worker to run.
    pub fn submit_job(&self, worker: Box<dyn Worker>) -> AppResult<()> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(AppError::pool_saturated("Job manager is shut down"));
        }

        let capacity = self.config.queue_capacity;
        self.active_workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |active| {
                (capacity == 0 || active < capacity).then_some(active + 1)
            })
            .map_err(|active| {
                AppError::pool_saturated(format!(
                    "Job manager queue is full ({active} of {capacity} workers outstanding)"
                ))
            })?;

        let name = worker.name();
        let slots = Arc::clone(&self.slots);
        let completed = self.completed.clone();
        let shutdown = self.shutdown.subscribe();

        tracing::debug!("Submitted worker '{}'", name);

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_signalled(shutdown) => {
                    tracing::warn!("Worker '{}' aborted by shutdown", name);
                }
                result = run_worker(worker, slots) => {
                    if completed.send(result).is_err() {
                        tracing::warn!("Worker '{}' finished after its monitor stopped", name);
                    }
                }
            }
        });

        Ok(())
    }

    /// Workers submitted and not yet drained by the monitor.
    pub fn active_worker_count(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Whether [`shut_down_now`](Self::shut_down_now) has been called.
    pub fn is_shut_down(&self) -> bool {
        !self.accepting.load(Ordering::SeqCst)
    }

    /// Stop accepting work, abort running workers, and stop the monitor.
    ///
    /// External effects of aborted workers are not rolled back.
    pub fn shut_down_now(&self) {
        if !self.accepting.swap(false, Ordering::SeqCst) {
            return;
        }
        self.slots.close();
        self.shutdown.send_replace(true);
        if let Some(task) = &self.monitor_task {
            task.abort();
        }

        tracing::info!(
            "Job manager shut down with {} workers outstanding",
            self.active_worker_count()
        );
    }
}

/// Resolve once the shutdown flag is raised. Never resolves if the sender
/// is dropped without raising it.
pub(crate) async fn shutdown_signalled(mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Run one worker inside a pool slot and finalize its result.
async fn run_worker(mut worker: Box<dyn Worker>, slots: Arc<Semaphore>) -> WorkerResult {
    let mut result = WorkerResult::new(worker.name());

    let _permit = match slots.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            result.fail("Job manager closed before the worker could start");
            result.end_time = Some(Utc::now());
            return result;
        }
    };

    result.start_time = Some(Utc::now());
    let outcome = AssertUnwindSafe(worker.do_work(&mut result))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => {
            if result.is_pending() {
                result.succeed();
            }
        }
        Ok(Err(e)) => result.fail(e.to_string()),
        Err(panic) => result.fail(format!("Worker panicked: {}", panic_message(&*panic))),
    }
    result.end_time = Some(Utc::now());
    result
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
