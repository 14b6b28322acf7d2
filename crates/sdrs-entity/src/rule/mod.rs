//! Retention rule entities.

pub mod model;
pub mod rule_type;

pub use model::RetentionRule;
pub use rule_type::RetentionRuleType;
