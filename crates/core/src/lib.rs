//! # Metricore Core
//!
//! In-process metrics engine: a registry of named metrics, runtime-bound
//! reporting policies, and the presentation of accumulated state.
//!
//! This crate contains:
//! - Aggregation stores (go / no-go running statistics, histogram buckets)
//! - The [`Registry`] and its policy binding protocol
//! - Port interfaces ([`ReportSink`], [`Scheduler`]) for external
//!   collaborators
//! - The bounded text formatter used by report sinks
//!
//! ## Architecture Principles
//! - Only depends on `metricore-common`
//! - No timers, threads, or I/O: scheduling and reporting happen behind
//!   traits
//! - Single owner: the registry is mutated through `&mut self` and wrapped in
//!   one coarse lock when shared
//!
//! ## Example
//!
//! ```
//! use metricore_core::{MetricFlags, Outcome, Registry};
//!
//! let mut registry = Registry::builder().build();
//! let latency = registry.create_metric("latency_us", MetricFlags::MEAN).unwrap();
//!
//! registry.record_event(latency, Outcome::Go, 100);
//! registry.record_event(latency, Outcome::Go, 300);
//!
//! let text = registry.render_metric(latency).unwrap();
//! assert_eq!(text, "latency_us: Go: 2, mean: 200, min: 100, max: 300");
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod aggregate;
pub mod buckets;
pub mod error;
pub mod flags;
pub mod format;
pub mod metric;
pub mod policy;
pub mod ports;
pub mod registry;

// Test doubles
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use aggregate::{AggregateStore, BranchStats};
pub use buckets::{Bucket, BucketStore, MAX_BUCKET_NAME_LEN};
pub use error::{MetricsError, MetricsResult};
pub use flags::{MetricFlags, MetricKind, Outcome};
pub use format::{format_metric, render_metric};
pub use metric::{Metric, MetricId, MetricStore, Owner};
pub use policy::{DynamicPolicy, PolicyDefinition, PolicyId};
pub use ports::{MetricReport, NoOpReportSink, NoOpScheduler, ReportSink, ScheduleHandle, Scheduler};
pub use registry::{Registry, RegistryBuilder, RegistryLimits};
