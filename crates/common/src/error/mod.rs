//! Error classification shared by every metricore error type.
//!
//! Each crate defines its own `thiserror` enum and implements
//! [`ErrorClassification`] so callers can make uniform retry and alerting
//! decisions without matching on crate-specific variants.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Unknown metric handle, missing policy |
//! | **Warning** | Degraded but operational | Capacity limit reached |
//! | **Error** | Failure requiring attention | Invalid configuration, scheduler failure |
//! | **Critical** | System integrity at risk | Allocator refusing memory |
//!
//! ## Example
//!
//! ```rust
//! use metricore_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum WidgetError {
//!     Missing,
//!     Exhausted,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Exhausted)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Missing => ErrorSeverity::Info,
//!             Self::Exhausted => ErrorSeverity::Warning,
//!         }
//!     }
//! }
//!
//! assert!(WidgetError::Exhausted.is_retryable());
//! assert!(!WidgetError::Missing.is_critical());
//! ```

use std::fmt;

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: the same call may succeed later once
    /// memory or capacity frees up.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring, alerting, and logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
