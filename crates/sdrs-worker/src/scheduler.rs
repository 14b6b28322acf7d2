//! Cron scheduler for the periodic retention sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use sdrs_core::config::SchedulerConfig;
use sdrs_core::error::AppError;
use sdrs_service::RetentionService;

use crate::jobs::DatasetRuleWorker;
use crate::manager::JobManager;

/// Cron-based scheduler that re-runs dataset rules
pub struct RetentionScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Pool the sweep submits workers to
    manager: Arc<JobManager>,
    /// Retention service handed to each worker
    service: Arc<RetentionService>,
    /// Schedule settings
    config: SchedulerConfig,
}

impl std::fmt::Debug for RetentionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl RetentionScheduler {
    /// Create a new retention scheduler
    pub async fn new(
        manager: Arc<JobManager>,
        service: Arc<RetentionService>,
        config: SchedulerConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            manager,
            service,
            config,
        })
    }

    /// Register all configured scheduled tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!("Scheduled retention sweep is disabled");
            return Ok(());
        }
        self.register_dataset_sweep().await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Retention scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Retention scheduler shut down");
        Ok(())
    }

    /// Dataset rule sweep, on `dataset_sweep_cron`
    async fn register_dataset_sweep(&self) -> Result<(), AppError> {
        let manager = Arc::clone(&self.manager);
        let service = Arc::clone(&self.service);
        let cron = self.config.dataset_sweep_cron.clone();

        let job = CronJob::new_async(cron.as_str(), move |_uuid, _lock| {
            let manager = Arc::clone(&manager);
            let service = Arc::clone(&service);
            Box::pin(async move {
                tracing::debug!("Running scheduled dataset rule sweep");
                if let Err(e) = sweep_dataset_rules(&manager, &service).await {
                    tracing::error!("Dataset rule sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid dataset sweep schedule '{}': {}",
                cron, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add dataset sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: dataset_sweep ({})", cron);
        Ok(())
    }
}

/// Submit one [`DatasetRuleWorker`] per project with active dataset rules.
///
/// Returns the number of workers accepted. A rejected submission is logged
/// and does not stop the sweep.
pub async fn sweep_dataset_rules(
    manager: &JobManager,
    service: &Arc<RetentionService>,
) -> Result<usize, AppError> {
    let projects = service.projects_with_dataset_rules().await?;
    let mut submitted = 0;

    for project_id in projects {
        let worker = DatasetRuleWorker::new(Arc::clone(service), project_id.clone());
        match manager.submit_job(Box::new(worker)) {
            Ok(()) => submitted += 1,
            Err(e) => tracing::error!(
                "Failed to submit dataset rules of project '{}': {}",
                project_id,
                e
            ),
        }
    }

    tracing::info!("Dataset rule sweep submitted {} workers", submitted);
    Ok(submitted)
}
