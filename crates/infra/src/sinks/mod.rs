//! Report sink implementations

pub mod tracing_sink;

pub use tracing_sink::TracingReportSink;
