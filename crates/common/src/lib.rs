//! Foundation utilities shared across metricore crates.
//!
//! # Feature Tiers
//!
//! - always on: error classification, clock abstraction, unit humanizing,
//!   serde helpers
//! - `runtime`: tokio-backed recurring timers

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod time;
pub mod utils;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use error::{ErrorClassification, ErrorSeverity};
pub use time::{Clock, MockClock, SystemClock};
pub use utils::serde::duration_micros;
