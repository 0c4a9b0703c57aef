//! Configuration loading and management
//!
//! This module provides the [`MetricsConfig`] document and utilities for
//! loading it from TOML or JSON files.

pub mod loader;

use std::sync::Arc;

use metricore_core::{PolicyDefinition, RegistryLimits};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used items
pub use loader::{load, load_from_file, load_from_str, probe_config_paths, CONFIG_ENV_VAR};

/// Default size of the buffer each report is rendered into
pub const DEFAULT_FORMAT_BUFFER_LEN: usize = 1024;

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Reporting policies, created in order
    pub policies: Vec<PolicyDefinition>,
    /// Registry allocation limits
    pub limits: RegistryLimits,
    /// Report rendering
    pub report: ReportConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl MetricsConfig {
    /// Policy definitions in the shared form the registry takes
    pub fn policy_definitions(&self) -> Vec<Arc<PolicyDefinition>> {
        self.policies.iter().cloned().map(Arc::new).collect()
    }

    /// Check constraints serde cannot express
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for an empty or duplicate policy name,
    /// or a zero-length format buffer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for policy in &self.policies {
            if policy.name.trim().is_empty() {
                return Err(ConfigError::Invalid("policy name must not be empty".into()));
            }
            if !seen.insert(policy.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate policy name '{}'", policy.name)));
            }
        }

        if self.report.format_buffer_len == 0 {
            return Err(ConfigError::Invalid("report.format_buffer_len must be positive".into()));
        }
        Ok(())
    }
}

/// How reports are rendered by the tracing sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Bytes available to one rendered report, terminator included
    pub format_buffer_len: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { format_buffer_len: DEFAULT_FORMAT_BUFFER_LEN }
    }
}

/// Log line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line human readable output
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `metricore=debug`
    pub level: String,
    /// Output layout
    pub format: LogFormat,
    /// Colored output for the human readable layouts
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::default(), ansi: true }
    }
}
