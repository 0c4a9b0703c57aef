//! Test doubles for the registry ports
//!
//! Used by this crate's tests and by downstream crates that want to drive a
//! registry without a runtime.

use std::collections::BTreeSet;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{MetricsError, MetricsResult};
use crate::format::render_metric;
use crate::metric::{MetricId, Owner};
use crate::policy::PolicyId;
use crate::ports::{MetricReport, ReportSink, ScheduleHandle, Scheduler};
use crate::registry::Registry;

/// One report captured by [`CollectingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedReport {
    /// Handle of the reported metric
    pub id: MetricId,
    /// Metric name at report time
    pub name: String,
    /// Name of the triggering policy, if any
    pub policy: Option<String>,
    /// Rendered metric text at report time
    pub line: String,
    /// Report timestamp
    pub reported_at_us: u64,
}

/// Sink that renders and keeps every report it receives
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<CollectedReport>>,
}

impl CollectingSink {
    /// Snapshot of all captured reports, oldest first
    pub fn reports(&self) -> Vec<CollectedReport> {
        self.reports.lock().clone()
    }

    /// Rendered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.reports.lock().iter().map(|r| r.line.clone()).collect()
    }

    /// Reported metric handles, oldest first
    pub fn ids(&self) -> Vec<MetricId> {
        self.reports.lock().iter().map(|r| r.id).collect()
    }

    /// Number of captured reports
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// Forget captured reports
    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ReportSink for CollectingSink {
    fn report(&self, report: &MetricReport<'_>) {
        let collected = CollectedReport {
            id: report.id,
            name: report.metric.name().to_owned(),
            policy: report.policy.map(|p| p.name.clone()),
            line: render_metric(report.metric, report.reported_at_us),
            reported_at_us: report.reported_at_us,
        };
        self.reports.lock().push(collected);
    }
}

/// One registration made with [`ManualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDump {
    /// Handle returned to the registry
    pub handle: ScheduleHandle,
    /// Policy to dump
    pub policy: PolicyId,
    /// Delay before the first dump
    pub initial_delay: Duration,
    /// Period between dumps
    pub interval: Duration,
}

#[derive(Debug, Default)]
struct ManualState {
    next_handle: u64,
    scheduled: Vec<ScheduledDump>,
    cancelled: Vec<ScheduleHandle>,
    fail_after: Option<usize>,
}

/// Scheduler that never fires on its own
///
/// Tests call [`Registry::run_periodic`] with the policies returned by
/// [`ManualScheduler::active`] to simulate timer ticks.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    /// Let `successes` more registrations succeed, then refuse the rest
    pub fn fail_after(&self, successes: usize) {
        self.state.lock().fail_after = Some(successes);
    }

    /// Every registration ever made, in order
    pub fn scheduled(&self) -> Vec<ScheduledDump> {
        self.state.lock().scheduled.clone()
    }

    /// Every cancelled handle, in order
    pub fn cancelled(&self) -> Vec<ScheduleHandle> {
        self.state.lock().cancelled.clone()
    }

    /// Registrations that have not been cancelled
    pub fn active(&self) -> Vec<ScheduledDump> {
        let state = self.state.lock();
        state.scheduled.iter().filter(|s| !state.cancelled.contains(&s.handle)).copied().collect()
    }

    /// Fire every active registration once, as a timer tick would
    ///
    /// Returns the number of reports emitted.
    pub fn tick(&self, registry: &mut Registry) -> usize {
        self.active().iter().map(|s| registry.run_periodic(s.policy)).sum()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_periodic(
        &self,
        policy: PolicyId,
        initial_delay: Duration,
        interval: Duration,
    ) -> MetricsResult<ScheduleHandle> {
        let mut state = self.state.lock();

        if let Some(remaining) = state.fail_after.as_mut() {
            if *remaining == 0 {
                return Err(MetricsError::Schedule {
                    policy: policy.to_string(),
                    reason: "manual scheduler refused registration".into(),
                });
            }
            *remaining -= 1;
        }

        let handle = ScheduleHandle(state.next_handle);
        state.next_handle += 1;
        state.scheduled.push(ScheduledDump { handle, policy, initial_delay, interval });
        Ok(handle)
    }

    fn cancel(&self, handle: ScheduleHandle) {
        self.state.lock().cancelled.push(handle);
    }
}

/// Assert that every live metric sits in exactly the collection its owner
/// tag names, and that no collection holds a dead or foreign handle
///
/// # Panics
/// Panics with a description of the first violation found.
pub fn assert_single_owner(registry: &Registry) {
    let unbound: BTreeSet<MetricId> = registry.unbound().collect();
    let mut seen = BTreeSet::new();

    for policy in registry.policies() {
        for member in policy.members() {
            assert!(seen.insert(member), "{member} is a member of more than one collection");
            assert!(!unbound.contains(&member), "{member} is both unbound and in {}", policy.id());
        }
    }
    seen.extend(unbound.iter().copied());

    assert_eq!(seen.len(), registry.metric_count(), "collections and live metrics disagree");

    for (id, metric) in registry.metrics() {
        let held = match metric.owner() {
            Owner::Unbound => unbound.contains(&id),
            Owner::Policy(policy) => registry.policy(policy).is_some_and(|p| p.contains(id)),
        };
        assert!(held, "{id} is not held by its owner {:?}", metric.owner());
    }
}
