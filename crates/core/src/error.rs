//! Error types for registry operations

use std::collections::TryReserveError;

use metricore_common::error::{ErrorClassification, ErrorSeverity};
use thiserror::Error;

use crate::metric::MetricId;
use crate::policy::PolicyId;

/// Errors surfaced by the metrics registry
///
/// Programming errors (an outcome outside go / no-go, an oversized bucket
/// name, recording against the wrong store kind) are not represented here:
/// they panic at the call site.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The allocator refused memory for a new object
    #[error("Allocation failed for {resource}")]
    Allocation { resource: &'static str },

    /// A configured registry limit was reached
    #[error("Capacity exhausted for {resource} (limit {limit})")]
    CapacityExhausted { resource: &'static str, limit: usize },

    /// No dynamic policy carries the requested name
    #[error("No policy named '{0}'")]
    PolicyNotFound(String),

    /// The policy handle does not refer to a live policy
    #[error("Unknown policy handle {0}")]
    UnknownPolicy(PolicyId),

    /// The metric handle does not refer to a live metric
    #[error("Unknown metric handle {0}")]
    UnknownMetric(MetricId),

    /// The scheduler refused to register a periodic dump
    #[error("Failed to schedule policy '{policy}': {reason}")]
    Schedule { policy: String, reason: String },
}

impl MetricsError {
    pub(crate) fn allocation(resource: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Self::Allocation { resource }
    }
}

impl ErrorClassification for MetricsError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Allocation { .. } | Self::CapacityExhausted { .. } | Self::Schedule { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PolicyNotFound(_) | Self::UnknownPolicy(_) | Self::UnknownMetric(_) => {
                ErrorSeverity::Info
            }
            Self::CapacityExhausted { .. } => ErrorSeverity::Warning,
            Self::Schedule { .. } => ErrorSeverity::Error,
            Self::Allocation { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Result type alias for registry operations
pub type MetricsResult<T> = Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates the display text of lookup failures.
    ///
    /// Assertions:
    /// - Confirms the policy name appears in the message.
    #[test]
    fn test_policy_not_found_display() {
        let err = MetricsError::PolicyNotFound("P".to_string());
        assert_eq!(err.to_string(), "No policy named 'P'");
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Info);
    }

    /// Validates classification of resource failures.
    ///
    /// Assertions:
    /// - Ensures allocation failures are critical and retryable.
    /// - Ensures capacity exhaustion is a retryable warning.
    #[test]
    fn test_resource_failures_classification() {
        let alloc = MetricsError::Allocation { resource: "metric" };
        assert!(alloc.is_retryable());
        assert!(alloc.is_critical());

        let full = MetricsError::CapacityExhausted { resource: "bucket", limit: 8 };
        assert_eq!(full.to_string(), "Capacity exhausted for bucket (limit 8)");
        assert!(full.is_retryable());
        assert_eq!(full.severity(), ErrorSeverity::Warning);
    }

    /// Validates conversion from a failed reservation.
    ///
    /// Assertions:
    /// - Confirms the mapped error names the resource.
    #[test]
    fn test_allocation_from_try_reserve() {
        let mut names: Vec<u8> = Vec::new();
        let err = names.try_reserve(usize::MAX).map_err(MetricsError::allocation("bucket"));
        assert_eq!(err, Err(MetricsError::Allocation { resource: "bucket" }));
    }
}
