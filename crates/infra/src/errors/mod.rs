//! Error types for the runtime adapters
//!
//! Core failures arrive as [`MetricsError`] and are wrapped, never flattened,
//! so callers can still match on the registry's own variants.

mod conversions;

use std::path::PathBuf;

use metricore_common::error::{ErrorClassification, ErrorSeverity};
use metricore_core::MetricsError;
use thiserror::Error;

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named file does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The file extension names no supported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The text is not valid for its format
    #[error("Invalid {format} config: {message}")]
    Parse {
        /// Format being parsed
        format: ConfigFormat,
        /// Parser diagnostic
        message: String,
    },

    /// Parsed but semantically invalid
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Errors surfaced by the infrastructure crate
#[derive(Debug, Error)]
pub enum InfraError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A registry operation failed
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// No tokio runtime is available to drive timers
    #[error("No tokio runtime available: {0}")]
    Runtime(String),

    /// The global tracing subscriber could not be installed
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

/// Result type for infrastructure operations
pub type InfraResult<T> = Result<T, InfraError>;

impl ErrorClassification for ConfigError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Read { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

impl ErrorClassification for InfraError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Config(err) => err.is_retryable(),
            Self::Metrics(err) => err.is_retryable(),
            Self::Runtime(_) | Self::Logging(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config(err) => err.severity(),
            Self::Metrics(err) => err.severity(),
            Self::Runtime(_) => ErrorSeverity::Critical,
            Self::Logging(_) => ErrorSeverity::Warning,
        }
    }
}
