//! Background work for SDRS.
//!
//! This crate provides:
//! - A job manager that runs submitted workers on a bounded pool
//! - A monitor that drains finished workers and logs their outcome
//! - Workers that execute retention rules through the retention service
//! - A cron scheduler for the periodic dataset rule sweep

pub mod jobs;
pub mod manager;
pub mod monitor;
pub mod scheduler;
pub mod worker;

pub use manager::JobManager;
pub use monitor::JobManagerMonitor;
pub use scheduler::RetentionScheduler;
pub use worker::{Worker, WorkerError, WorkerResult, WorkerStatus};
