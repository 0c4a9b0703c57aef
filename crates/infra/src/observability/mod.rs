//! Observability infrastructure: process-wide log output
//!
//! Reports themselves are `tracing` events (see
//! [`TracingReportSink`](crate::sinks::TracingReportSink)), so installing a
//! subscriber with [`init_logging`] is all it takes to see them.

pub mod logging;

pub use logging::init_logging;
