//! Request-independent validation shared by every rule entry point.
//!
//! Checks return a [`ValidationResult`] instead of failing on the first
//! problem, so callers can compose partial results and report every
//! violation at once.

pub mod fields;

pub use fields::{
    RETENTION_MAX_DAYS, STORAGE_PREFIX, validate_data_storage_name, validate_project_id,
    validate_retention_period,
};

use crate::error::AppError;
use crate::result::AppResult;

/// A list of user-actionable violations. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    messages: Vec<String>,
}

impl ValidationResult {
    /// Create a result from a list of violation messages.
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// A result with no violations.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A result with exactly one violation.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Concatenate the violations of several partial results.
    pub fn compose(results: impl IntoIterator<Item = ValidationResult>) -> Self {
        Self {
            messages: results.into_iter().flat_map(|r| r.messages).collect(),
        }
    }

    /// Whether no violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    /// The recorded violations, in the order they were found.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Convert into an [`AppError`] of kind `Validation` when invalid.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AppError::validation(self.messages.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_compose_concatenates_in_order() {
        let composed = ValidationResult::compose([
            ValidationResult::from_message("a"),
            ValidationResult::ok(),
            ValidationResult::new(vec!["b".into(), "c".into()]),
        ]);
        assert_eq!(composed.messages(), ["a", "b", "c"]);
        assert!(!composed.is_valid());
    }

    #[test]
    fn test_empty_compose_is_valid() {
        let composed = ValidationResult::compose(Vec::new());
        assert!(composed.is_valid());
        assert!(composed.into_result().is_ok());
    }

    #[test]
    fn test_into_result_joins_messages() {
        let err = ValidationResult::new(vec!["x".into(), "y".into()])
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "x; y");
    }
}
