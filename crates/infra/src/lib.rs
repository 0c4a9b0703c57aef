//! # Metricore Infrastructure
//!
//! Runtime adapters for the ports defined in `metricore-core`.
//!
//! This crate contains:
//! - Configuration loading (TOML / JSON)
//! - A tokio-backed [`Scheduler`](metricore_core::Scheduler) driving policy
//!   dumps
//! - A `tracing` report sink
//! - Global logging setup
//!
//! ## Architecture
//! - Implements traits defined in `metricore-core`
//! - Depends on `metricore-common` and `metricore-core`
//! - Contains all "impure" code (timers, I/O, global subscriber)

pub mod config;
pub mod engine;
pub mod errors;
pub mod observability;
pub mod scheduling;
pub mod sinks;

// Re-export commonly used items
pub use config::{LogFormat, LoggingConfig, MetricsConfig, ReportConfig};
pub use engine::{MetricsEngine, MetricsEngineBuilder};
pub use errors::{ConfigError, ConfigFormat, InfraError, InfraResult};
pub use observability::init_logging;
pub use scheduling::{SharedRegistry, TokioScheduler};
pub use sinks::TracingReportSink;
