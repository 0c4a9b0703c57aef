//! Conversions from parser errors into [`ConfigError`].

use super::{ConfigError, ConfigFormat};

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse { format: ConfigFormat::Toml, message: err.to_string() }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse { format: ConfigFormat::Json, message: err.to_string() }
    }
}
