//! Integration tests for SDRS.

mod config_test;
mod global_rule_test;
mod helpers;
mod job_manager_test;
mod retention_test;
