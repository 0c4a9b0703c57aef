//! Serialization utilities for common data types

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Custom serialization module for Duration as whole microseconds
///
/// Policy report intervals are expressed in microseconds in configuration
/// files, matching the resolution of metric timestamps.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use metricore_common::duration_micros;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_micros")]
///     interval: Duration,
/// }
/// ```
pub mod duration_micros {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as microseconds (u64), saturating at `u64::MAX`
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        serializer.serialize_u64(micros)
    }

    /// Deserialize microseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u64::deserialize(deserializer)?;
        Ok(Duration::from_micros(micros))
    }
}
