//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::time::Duration;

use metricore_infra::config;
use metricore_infra::{ConfigError, LogFormat};
use tempfile::{Builder, NamedTempFile};

fn temp_config(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_toml_file() {
    let file = temp_config(
        ".toml",
        r#"
[[policies]]
name = "network"
report_interval_us = 10000000

[[policies]]
name = "manual"

[limits]
max_metrics = 100
max_buckets_per_metric = 16

[logging]
format = "pretty"
ansi = false
"#,
    );

    let config = config::load_from_file(file.path()).expect("Failed to load TOML config");

    assert_eq!(config.policies.len(), 2);
    assert_eq!(config.policies[0].name, "network");
    assert_eq!(config.policies[0].report_interval, Duration::from_secs(10));
    assert!(!config.policies[1].is_scheduled());
    assert_eq!(config.limits.max_metrics, Some(100));
    assert_eq!(config.limits.max_buckets_per_metric, Some(16));
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(!config.logging.ansi);
}

#[test]
fn test_load_config_from_json_file() {
    let file = temp_config(
        ".json",
        r#"{
            "policies": [
                { "name": "fast", "report_interval_us": 500000, "reset_after_dump": true }
            ],
            "report": { "format_buffer_len": 128 }
        }"#,
    );

    let config = config::load_from_file(file.path()).expect("Failed to load JSON config");

    assert_eq!(config.policies[0].report_interval, Duration::from_millis(500));
    assert!(config.policies[0].reset_after_dump);
    assert_eq!(config.report.format_buffer_len, 128);
    assert_eq!(config.limits.max_metrics, None);
}

#[test]
fn test_load_config_invalid_toml() {
    let file = temp_config(".toml", "[[policies]\nname = ");
    let result = config::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_load_config_duplicate_policy_names() {
    let file = temp_config(
        ".json",
        r#"{ "policies": [ { "name": "P" }, { "name": "P", "report_interval_us": 1 } ] }"#,
    );
    let result = config::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_config_unsupported_extension() {
    let file = temp_config(".yaml", "policies: []");
    let result = config::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"));
}

#[test]
fn test_load_config_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("metricore.toml");

    let result = config::load_from_file(&path);
    assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == path));
}
