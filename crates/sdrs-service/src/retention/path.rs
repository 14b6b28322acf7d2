//! Helpers for `gs://bucket/dataset/...` storage names.

use std::collections::{BTreeMap, BTreeSet};

use sdrs_core::validation::STORAGE_PREFIX;
use sdrs_entity::rule::{RetentionRule, RetentionRuleType};

/// `(project_id, bucket)` pair that identifies one global transfer job.
pub type PrefixMapKey = (String, String);

/// Dataset paths to exclude, grouped by project and bucket.
pub type PrefixMap = BTreeMap<PrefixMapKey, BTreeSet<String>>;

fn strip_scheme(data_storage_name: &str) -> &str {
    data_storage_name
        .strip_prefix(STORAGE_PREFIX)
        .unwrap_or(data_storage_name)
}

/// Bucket component of a storage name.
///
/// `gs://bucket/dataset/x` → `bucket`.
pub fn bucket_name(data_storage_name: &str) -> &str {
    let rest = strip_scheme(data_storage_name);
    rest.split_once('/').map_or(rest, |(bucket, _)| bucket)
}

/// Everything after the bucket, without a leading slash.
///
/// `gs://bucket/dataset/x` → `dataset/x`, `gs://bucket` → empty.
pub fn dataset_path(data_storage_name: &str) -> &str {
    let rest = strip_scheme(data_storage_name);
    rest.split_once('/').map_or("", |(_, path)| path)
}

/// Path up to and including its last `/`.
///
/// `dataset/file` → `dataset/`, `dataset/` → `dataset/`, `file` → empty.
pub fn parent_prefix(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..=idx])
}

/// Append a trailing `/` unless the path is empty or already has one.
pub fn with_trailing_slash(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Build the key of the prefix map.
pub fn prefix_map_key(project_id: &str, bucket: &str) -> PrefixMapKey {
    (project_id.to_string(), bucket.to_string())
}

/// Group the dataset paths of `rules` by `(project, bucket)`.
///
/// Only dataset rules contribute. A rule whose storage name has no dataset
/// path still registers its bucket, with nothing added to the set.
pub fn prefix_map(rules: &[RetentionRule]) -> PrefixMap {
    let mut map = PrefixMap::new();
    for rule in rules {
        match rule.rule_type {
            RetentionRuleType::Dataset => {}
            RetentionRuleType::Global | RetentionRuleType::User => continue,
        }

        let bucket = bucket_name(&rule.data_storage_name);
        let prefixes = map
            .entry(prefix_map_key(&rule.project_id, bucket))
            .or_default();
        let path = with_trailing_slash(dataset_path(&rule.data_storage_name));
        if !path.is_empty() {
            prefixes.insert(path);
        }
    }
    map
}
