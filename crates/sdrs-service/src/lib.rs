//! # sdrs-service
//!
//! Retention logic for SDRS. The executor turns rules into transfer jobs
//! through an injected [`TransferClient`](sdrs_core::traits::TransferClient);
//! the service loads rules from the repositories, runs the executor, and
//! persists the resulting jobs.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod repository;
pub mod retention;

pub use repository::{
    InMemoryJobRepository, InMemoryRuleRepository, RetentionJobRepository,
    RetentionRuleRepository,
};
pub use retention::{
    CreateRetentionRuleRequest, PrefixGenerator, RetentionRuleExecutor, RetentionService,
};
