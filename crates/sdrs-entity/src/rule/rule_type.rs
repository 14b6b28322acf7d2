//! Retention rule type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scope a retention rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionRuleType {
    /// Applies to every object of a bucket not covered by a dataset rule.
    Global,
    /// Applies to a single dataset path inside a bucket.
    Dataset,
    /// One-off deletion of an explicit target, not backed by a stored rule.
    #[serde(alias = "AD_HOC")]
    User,
}

impl RetentionRuleType {
    /// Return the type as the uppercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "GLOBAL",
            Self::Dataset => "DATASET",
            Self::User => "USER",
        }
    }

    /// Whether a rule of this type targets a dataset path rather than a bucket.
    pub fn targets_dataset(&self) -> bool {
        match self {
            Self::Global => false,
            Self::Dataset | Self::User => true,
        }
    }
}

impl fmt::Display for RetentionRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RetentionRuleType {
    type Err = sdrs_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GLOBAL" => Ok(Self::Global),
            "DATASET" => Ok(Self::Dataset),
            "USER" | "AD_HOC" => Ok(Self::User),
            _ => Err(sdrs_core::AppError::validation(format!(
                "Invalid retention rule type: '{s}'. Expected one of: GLOBAL, DATASET, USER"
            ))),
        }
    }
}
