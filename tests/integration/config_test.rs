//! Integration tests for configuration loading.

use sdrs_core::config::{AppConfig, PrefixGranularity};

#[test]
fn test_default_file_matches_built_in_defaults() {
    let config = AppConfig::load("integration").unwrap();
    let defaults = AppConfig::default();

    assert_eq!(config.transfer.provider, defaults.transfer.provider);
    assert_eq!(config.transfer.shadow_suffix, "shadow");
    assert_eq!(config.transfer.max_prefix_count, 1000);
    assert_eq!(config.transfer.max_lookback_days, 365);
    assert_eq!(
        config.transfer.default_exclude_prefixes,
        defaults.transfer.default_exclude_prefixes
    );
    assert_eq!(config.transfer.prefix_granularity, PrefixGranularity::Day);
    assert_eq!(config.worker.pool_size, defaults.worker.pool_size);
    assert_eq!(config.scheduler.dataset_sweep_cron, "0 0 2 * * *");
    assert_eq!(config.logging.format, "json");
}
