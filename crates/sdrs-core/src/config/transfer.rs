//! Transfer service and rule executor configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Calendar unit used when generating time-bucketed prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrefixGranularity {
    /// One prefix per year: `path/YYYY/`.
    Year,
    /// One prefix per month: `path/YYYY/MM/`.
    Month,
    /// One prefix per day: `path/YYYY/MM/DD/`.
    #[default]
    Day,
    /// One prefix per hour: `path/YYYY/MM/DD/HH/`.
    Hour,
}

impl PrefixGranularity {
    /// Return the granularity as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
        }
    }
}

impl fmt::Display for PrefixGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer collaborator and retention executor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferConfig {
    /// Transfer client provider: `"memory"` or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the transfer service REST API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token sent with every request (`http` provider only).
    #[serde(default)]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Suffix appended to a source bucket to name its shadow bucket.
    #[serde(default = "default_shadow_suffix")]
    pub shadow_suffix: String,
    /// Placeholder project id carried by global rules.
    #[serde(default = "default_project_id")]
    pub default_project_id: String,
    /// Maximum number of prefixes the transfer service accepts per job.
    #[serde(default = "default_max_prefix_count")]
    #[validate(range(min = 1, max = 1000))]
    pub max_prefix_count: usize,
    /// How far back dataset rules look when generating prefixes.
    #[serde(default = "default_max_lookback_days")]
    #[validate(range(min = 1, max = 3650))]
    pub max_lookback_days: i64,
    /// Exclude list used by global jobs on buckets with no dataset rules.
    #[serde(default = "default_exclude_prefixes")]
    pub default_exclude_prefixes: Vec<String>,
    /// Calendar unit of generated dataset prefixes.
    #[serde(default)]
    pub prefix_granularity: PrefixGranularity,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            access_token: None,
            request_timeout_seconds: default_request_timeout(),
            shadow_suffix: default_shadow_suffix(),
            default_project_id: default_project_id(),
            max_prefix_count: default_max_prefix_count(),
            max_lookback_days: default_max_lookback_days(),
            default_exclude_prefixes: default_exclude_prefixes(),
            prefix_granularity: PrefixGranularity::default(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_endpoint() -> String {
    "https://storagetransfer.googleapis.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shadow_suffix() -> String {
    "shadow".to_string()
}

fn default_project_id() -> String {
    "global-default".to_string()
}

fn default_max_prefix_count() -> usize {
    1000
}

fn default_max_lookback_days() -> i64 {
    365
}

fn default_exclude_prefixes() -> Vec<String> {
    ["2017/", "2018/", "2019/", "2020/"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}
