//! Background worker pool configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Job manager pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkerConfig {
    /// Number of workers allowed to run concurrently.
    #[serde(default = "default_pool_size")]
    #[validate(range(min = 1, max = 256))]
    pub pool_size: usize,
    /// Maximum number of submitted-but-unfinished workers (0 = unbounded).
    #[serde(default)]
    pub queue_capacity: usize,
    /// Interval in milliseconds between monitor drain passes.
    #[serde(default = "default_monitor_poll_interval")]
    #[validate(range(min = 10, max = 60000))]
    pub monitor_poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            queue_capacity: 0,
            monitor_poll_interval_ms: default_monitor_poll_interval(),
        }
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_monitor_poll_interval() -> u64 {
    1000
}
