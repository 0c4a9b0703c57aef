//! Global `tracing` subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{InfraError, InfraResult};

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Errors
/// Returns [`InfraError::Logging`] when the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> InfraResult<()> {
    let filter = filter_for(config, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(config.ansi);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| InfraError::Logging(e.to_string()))?;

    tracing::debug!(format = ?config.format, "logging initialised");
    Ok(())
}

fn filter_for(config: &LoggingConfig, rust_log: Option<String>) -> InfraResult<EnvFilter> {
    let directive = rust_log.filter(|d| !d.trim().is_empty()).unwrap_or_else(|| config.level.clone());
    EnvFilter::try_new(&directive).map_err(|e| InfraError::Logging(format!("{directive}: {e}")))
}
