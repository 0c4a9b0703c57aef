//! Static policy definitions and their runtime instances

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use metricore_common::duration_micros;
use serde::{Deserialize, Serialize};

use crate::metric::MetricId;
use crate::ports::ScheduleHandle;

/// Externally owned reporting policy, typically loaded from configuration
///
/// The registry shares definitions through `Arc` and never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDefinition {
    /// Name metrics bind to
    pub name: String,
    /// Period of the dump; zero means the policy is never scheduled
    #[serde(rename = "report_interval_us", with = "duration_micros", default)]
    pub report_interval: Duration,
    /// Reset each metric's accumulated state after it is reported
    #[serde(default)]
    pub reset_after_dump: bool,
}

impl PolicyDefinition {
    /// Create a definition with the given name and dump period
    pub fn new(name: impl Into<String>, report_interval: Duration) -> Self {
        Self { name: name.into(), report_interval, reset_after_dump: false }
    }

    /// Reset metrics after every report
    #[must_use]
    pub fn with_reset_after_dump(mut self) -> Self {
        self.reset_after_dump = true;
        self
    }

    /// Whether a periodic dump should be registered for this policy
    pub fn is_scheduled(&self) -> bool {
        !self.report_interval.is_zero()
    }
}

/// Opaque handle to a dynamic policy owned by a [`Registry`](crate::Registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyId(pub(crate) u64);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "policy#{}", self.0)
    }
}

/// Runtime instance of a [`PolicyDefinition`] and the metrics bound to it
#[derive(Debug)]
pub struct DynamicPolicy {
    id: PolicyId,
    definition: Arc<PolicyDefinition>,
    schedule: Option<ScheduleHandle>,
    members: IndexSet<MetricId>,
}

impl DynamicPolicy {
    pub(crate) fn new(id: PolicyId, definition: Arc<PolicyDefinition>) -> Self {
        Self { id, definition, schedule: None, members: IndexSet::new() }
    }

    /// Policy handle
    pub fn id(&self) -> PolicyId {
        self.id
    }

    /// Shared static definition
    pub fn definition(&self) -> &Arc<PolicyDefinition> {
        &self.definition
    }

    /// Policy name
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Whether a periodic dump is registered
    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Member metrics, in the order they joined
    pub fn members(&self) -> impl Iterator<Item = MetricId> + '_ {
        self.members.iter().copied()
    }

    /// Number of member metrics
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `metric` is bound to this policy
    pub fn contains(&self, metric: MetricId) -> bool {
        self.members.contains(&metric)
    }

    pub(crate) fn set_schedule(&mut self, handle: ScheduleHandle) {
        self.schedule = Some(handle);
    }

    pub(crate) fn take_schedule(&mut self) -> Option<ScheduleHandle> {
        self.schedule.take()
    }

    pub(crate) fn insert(&mut self, metric: MetricId) {
        self.members.insert(metric);
    }

    pub(crate) fn remove(&mut self, metric: MetricId) -> bool {
        self.members.shift_remove(&metric)
    }

    pub(crate) fn take_members(&mut self) -> IndexSet<MetricId> {
        std::mem::take(&mut self.members)
    }
}
