//! Built-in worker implementations.

pub mod retention;

pub use retention::{DatasetRuleWorker, GlobalRuleAction, GlobalRuleWorker, UserRuleWorker};
