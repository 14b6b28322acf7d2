//! Scheduled retention sweep configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Cron settings for re-invoking retention rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerConfig {
    /// Whether the scheduled sweep is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression for the dataset rule sweep.
    #[serde(default = "default_dataset_sweep_cron")]
    pub dataset_sweep_cron: String,
    /// UTC hour at which recurring global transfer jobs run.
    #[serde(default = "default_rule_schedule_hour")]
    #[validate(range(max = 23))]
    pub default_rule_schedule_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dataset_sweep_cron: default_dataset_sweep_cron(),
            default_rule_schedule_hour: default_rule_schedule_hour(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dataset_sweep_cron() -> String {
    "0 0 2 * * *".to_string()
}

fn default_rule_schedule_hour() -> u32 {
    3
}
