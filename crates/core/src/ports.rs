//! Ports for the collaborators the registry drives but does not implement
//!
//! - [`Scheduler`]: arranges the periodic dump of each scheduled policy
//! - [`ReportSink`]: receives the state of every metric being reported

use std::fmt::Debug;
use std::time::Duration;

use crate::error::MetricsResult;
use crate::metric::{Metric, MetricId};
use crate::policy::{PolicyDefinition, PolicyId};

/// Read-only view handed to a [`ReportSink`]
#[derive(Debug, Clone, Copy)]
pub struct MetricReport<'a> {
    /// Handle of the reported metric
    pub id: MetricId,
    /// Public state of the metric
    pub metric: &'a Metric,
    /// Policy that triggered the report; `None` for diagnostic dumps
    pub policy: Option<&'a PolicyDefinition>,
    /// Time of the report, in microseconds since the epoch
    pub reported_at_us: u64,
}

/// Destination for metric reports
///
/// Called while the registry is borrowed; implementations must not call back
/// into the registry.
pub trait ReportSink: Send + Sync + Debug {
    /// Deliver one metric report
    fn report(&self, report: &MetricReport<'_>);
}

/// Opaque token identifying one periodic registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(pub u64);

/// Periodic callback arrangement
///
/// The implementation must arrange for
/// [`Registry::run_periodic`](crate::Registry::run_periodic) to be invoked
/// with `policy` every `interval`, inside the same serialization domain as
/// every other registry mutation.
pub trait Scheduler: Send + Sync + Debug {
    /// Register a periodic dump for `policy`
    ///
    /// # Errors
    /// Returns [`MetricsError::Schedule`](crate::MetricsError::Schedule) when
    /// the registration cannot be made.
    fn schedule_periodic(
        &self,
        policy: PolicyId,
        initial_delay: Duration,
        interval: Duration,
    ) -> MetricsResult<ScheduleHandle>;

    /// Cancel a registration; no dump fires for it afterwards
    fn cancel(&self, handle: ScheduleHandle);
}

/// No-op sink that discards reports
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpReportSink;

impl ReportSink for NoOpReportSink {
    fn report(&self, _report: &MetricReport<'_>) {}
}

/// No-op scheduler: registrations succeed and never fire
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpScheduler;

impl Scheduler for NoOpScheduler {
    fn schedule_periodic(
        &self,
        policy: PolicyId,
        _initial_delay: Duration,
        _interval: Duration,
    ) -> MetricsResult<ScheduleHandle> {
        Ok(ScheduleHandle(policy.0))
    }

    fn cancel(&self, _handle: ScheduleHandle) {}
}
