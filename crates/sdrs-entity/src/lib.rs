//! # sdrs-entity
//!
//! Domain entity models for the Storage Data Retention Service. Every
//! struct in this crate is either a record exchanged with the persistence
//! collaborator or a domain value object. All entities derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`.

pub mod job;
pub mod rule;

pub use job::RetentionJob;
pub use rule::{RetentionRule, RetentionRuleType};
