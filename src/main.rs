//! SDRS Server: Storage Data Retention Service
//!
//! Main entry point that wires all crates together and runs the retention
//! scheduler until a shutdown signal arrives.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use sdrs_core::config::AppConfig;
use sdrs_core::error::AppError;
use sdrs_service::{
    InMemoryJobRepository, InMemoryRuleRepository, RetentionRuleExecutor, RetentionService,
};
use sdrs_worker::{JobManager, RetentionScheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SDRS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SDRS v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Transfer client ──────────────────────────────────
    let client = sdrs_transfer::connect(&config.transfer)?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let rule_repo = Arc::new(InMemoryRuleRepository::new());
    let job_repo = Arc::new(InMemoryJobRepository::new());

    // ── Step 3: Retention service ────────────────────────────────
    let executor = Arc::new(RetentionRuleExecutor::new(client, config.transfer.clone()));
    let service = Arc::new(RetentionService::new(
        rule_repo,
        job_repo,
        executor,
        config.scheduler.default_rule_schedule_hour,
    ));

    // ── Step 4: Job manager ──────────────────────────────────────
    let manager = Arc::new(JobManager::start(config.worker.clone()));

    // ── Step 5: Scheduler ────────────────────────────────────────
    let mut scheduler =
        RetentionScheduler::new(Arc::clone(&manager), service, config.scheduler.clone()).await?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    tracing::info!("SDRS is running; press Ctrl+C to stop");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping...");

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown error: {}", e);
    }
    manager.shut_down_now();

    tracing::info!("SDRS stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
