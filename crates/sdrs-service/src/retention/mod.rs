//! Retention rule execution.

pub mod executor;
pub mod path;
pub mod prefix;
pub mod service;

pub use executor::RetentionRuleExecutor;
pub use prefix::PrefixGenerator;
pub use service::{CreateRetentionRuleRequest, RetentionService};
