//! Field-level checks for retention rule attributes.

use super::ValidationResult;

/// Scheme every data storage name must start with.
pub const STORAGE_PREFIX: &str = "gs://";

/// Largest accepted retention period.
pub const RETENTION_MAX_DAYS: i32 = 200;

/// Check that a retention period is present and within `0..=200`.
pub fn validate_retention_period(retention_period: Option<i32>) -> ValidationResult {
    let Some(days) = retention_period else {
        return ValidationResult::from_message("retentionPeriod must be provided");
    };

    let mut messages = Vec::new();
    if days < 0 {
        messages.push("retentionPeriod must be at least 0".to_string());
    }
    if days > RETENTION_MAX_DAYS {
        messages.push(format!(
            "retentionPeriod exceeds maximum value of {RETENTION_MAX_DAYS}"
        ));
    }
    ValidationResult::new(messages)
}

/// Check that a data storage name looks like `gs://<bucket>/<dataset>`.
pub fn validate_data_storage_name(data_storage_name: Option<&str>) -> ValidationResult {
    let Some(name) = data_storage_name else {
        return ValidationResult::from_message("dataStorageName must be provided");
    };

    let Some(bucket_and_dataset) = name.strip_prefix(STORAGE_PREFIX) else {
        return ValidationResult::from_message(format!(
            "dataStorageName must start with '{STORAGE_PREFIX}'"
        ));
    };

    let mut messages = Vec::new();
    let mut segments = bucket_and_dataset.split('/');
    if segments.next().is_none_or(str::is_empty) {
        messages.push("dataStorageName must include a bucket name".to_string());
    }
    if segments.next().is_none_or(str::is_empty) {
        messages.push("dataStorageName must include a dataset name".to_string());
    }
    ValidationResult::new(messages)
}

/// Check that a project id is present for rule types that require one.
pub fn validate_project_id(project_id: Option<&str>, rule_type: &str) -> ValidationResult {
    match project_id {
        Some(id) if !id.trim().is_empty() => ValidationResult::ok(),
        _ => ValidationResult::from_message(format!(
            "projectId must be provided if type is {rule_type}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_period_bounds() {
        for days in [0, 1, 100, 199, 200] {
            assert!(validate_retention_period(Some(days)).is_valid(), "{days}");
        }

        let below = validate_retention_period(Some(-1));
        assert_eq!(below.messages(), ["retentionPeriod must be at least 0"]);

        let above = validate_retention_period(Some(201));
        assert_eq!(
            above.messages(),
            ["retentionPeriod exceeds maximum value of 200"]
        );
    }

    #[test]
    fn test_retention_period_missing() {
        let missing = validate_retention_period(None);
        assert_eq!(missing.messages(), ["retentionPeriod must be provided"]);
    }

    #[test]
    fn test_data_storage_name() {
        assert!(validate_data_storage_name(Some("gs://bucket/dataset")).is_valid());
        assert!(validate_data_storage_name(Some("gs://bucket/dataset/nested/")).is_valid());

        let no_scheme = validate_data_storage_name(Some("s3://bucket/dataset"));
        assert_eq!(no_scheme.messages(), ["dataStorageName must start with 'gs://'"]);

        let no_dataset = validate_data_storage_name(Some("gs://bucket/"));
        assert_eq!(
            no_dataset.messages(),
            ["dataStorageName must include a dataset name"]
        );

        let empty = validate_data_storage_name(Some("gs://"));
        assert_eq!(empty.messages().len(), 2);

        assert!(!validate_data_storage_name(None).is_valid());
    }

    #[test]
    fn test_project_id() {
        assert!(validate_project_id(Some("my-project"), "DATASET").is_valid());
        let missing = validate_project_id(Some("  "), "DATASET");
        assert_eq!(
            missing.messages(),
            ["projectId must be provided if type is DATASET"]
        );
    }
}
