//! Configuration loader
//!
//! Loads [`MetricsConfig`] from a TOML or JSON file.
//!
//! ## Loading Strategy
//! 1. If `METRICORE_CONFIG` is set, that file is loaded and must exist
//! 2. Otherwise the standard locations are probed
//! 3. If no file exists anywhere, built-in defaults are used
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./metricore.toml` or `./metricore.json` (current working directory)
//! 2. `./config/metricore.toml` or `./config/metricore.json`
//! 3. Next to the executable

use std::path::{Path, PathBuf};

use super::MetricsConfig;
use crate::errors::{ConfigError, ConfigFormat};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "METRICORE_CONFIG";

const FILE_STEM: &str = "metricore";

/// Load configuration with the fallback strategy described above
///
/// # Errors
/// Returns [`ConfigError`] when the file named by `METRICORE_CONFIG` is
/// missing, or when the selected file cannot be read, parsed or validated.
pub fn load() -> Result<MetricsConfig, ConfigError> {
    let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    load_with(explicit, probe_config_paths())
}

fn load_with(
    explicit: Option<PathBuf>,
    probed: Option<PathBuf>,
) -> Result<MetricsConfig, ConfigError> {
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "Config path taken from {CONFIG_ENV_VAR}");
        return load_from_file(&path);
    }

    match probed {
        Some(path) => load_from_file(&path),
        None => {
            tracing::info!("No config file found, using defaults");
            Ok(MetricsConfig::default())
        }
    }
}

/// Load and validate configuration from a file
///
/// The format is picked by extension: `.toml` or `.json`.
///
/// # Errors
/// Returns [`ConfigError::NotFound`] when the file does not exist, and the
/// read, format, parse or validation error otherwise.
pub fn load_from_file(path: &Path) -> Result<MetricsConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let format = format_for(path)?;
    tracing::info!(path = %path.display(), %format, "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    load_from_str(&contents, format)
}

/// Parse and validate configuration text
///
/// # Errors
/// Returns [`ConfigError::Parse`] for malformed text and
/// [`ConfigError::Invalid`] when validation fails.
pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<MetricsConfig, ConfigError> {
    let config: MetricsConfig = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };

    config.validate()?;
    tracing::debug!(policies = config.policies.len(), "Configuration parsed");
    Ok(config)
}

fn format_for(path: &Path) -> Result<ConfigFormat, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("json") => Ok(ConfigFormat::Json),
        Some(other) => Err(ConfigError::UnsupportedFormat(other.to_owned())),
        None => Err(ConfigError::UnsupportedFormat(String::new())),
    }
}

fn candidates_in(dir: &Path) -> [PathBuf; 2] {
    [dir.join(format!("{FILE_STEM}.toml")), dir.join(format!("{FILE_STEM}.json"))]
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first existing file, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
        candidates.extend(candidates_in(&cwd.join("config")));
    }

    if let Some(exe_dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        candidates.extend(candidates_in(exe_dir));
    }

    candidates.into_iter().find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use metricore_core::PolicyDefinition;

    use super::*;
    use crate::config::LogFormat;

    const TOML: &str = r#"
[[policies]]
name = "fast"
report_interval_us = 250000

[[policies]]
name = "hourly"
report_interval_us = 3600000000
reset_after_dump = true

[limits]
max_metrics = 512

[report]
format_buffer_len = 256

[logging]
level = "metricore=debug"
format = "json"
"#;

    /// Validates parsing a complete TOML document.
    ///
    /// Assertions:
    /// - Confirms intervals are read as microseconds.
    /// - Confirms omitted limits stay unbounded.
    #[test]
    fn test_load_from_str_toml() {
        let config = load_from_str(TOML, ConfigFormat::Toml).expect("valid config");

        assert_eq!(config.policies.len(), 2);
        assert_eq!(config.policies[0], PolicyDefinition::new("fast", Duration::from_millis(250)));
        assert!(config.policies[1].reset_after_dump);
        assert_eq!(config.policies[1].report_interval, Duration::from_secs(3600));
        assert_eq!(config.limits.max_metrics, Some(512));
        assert_eq!(config.limits.max_policies, None);
        assert_eq!(config.report.format_buffer_len, 256);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.ansi);
    }

    #[test]
    fn test_load_from_str_json() {
        let json = r#"{"policies":[{"name":"P","report_interval_us":1000000}]}"#;
        let config = load_from_str(json, ConfigFormat::Json).expect("valid config");

        assert_eq!(config.policies[0].report_interval, Duration::from_secs(1));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_str_rejects_duplicates() {
        let json = r#"{"policies":[{"name":"P"},{"name":"P"}]}"#;
        assert!(matches!(load_from_str(json, ConfigFormat::Json), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_format_for_extension() {
        assert_eq!(format_for(Path::new("a/metricore.toml")).ok(), Some(ConfigFormat::Toml));
        assert_eq!(format_for(Path::new("metricore.json")).ok(), Some(ConfigFormat::Json));
        assert!(matches!(
            format_for(Path::new("metricore.yaml")),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
        assert!(format_for(Path::new("metricore")).is_err());
    }

    /// Validates the fallback order without touching the process
    /// environment.
    ///
    /// Assertions:
    /// - Confirms an explicit missing path is an error.
    /// - Confirms a probed path that vanished reports that path.
    /// - Confirms defaults are used when nothing is found.
    #[test]
    fn test_load_with_fallbacks() {
        let missing = PathBuf::from("/nonexistent/metricore.toml");
        assert!(matches!(load_with(Some(missing.clone()), None), Err(ConfigError::NotFound(_))));
        assert!(matches!(
            load_with(None, Some(missing.clone())),
            Err(ConfigError::NotFound(path)) if path == missing
        ));

        let config = load_with(None, None).expect("defaults");
        assert_eq!(config, MetricsConfig::default());
    }
}
