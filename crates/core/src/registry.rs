//! The metrics registry: owner of every metric and dynamic policy
//!
//! Every live metric belongs to exactly one collection: the member set of
//! one dynamic policy, or the unbound pool. Each metric carries an [`Owner`]
//! tag naming that collection, and every move between collections goes
//! through [`Registry::detach`] followed by one attach, so the tag and the
//! collections never disagree.
//!
//! Policies can be created after the metrics that want them and can be
//! removed and re-added at runtime. A metric created with
//! [`Registry::create_metric_for`] remembers the policy name it wants; it
//! waits in the unbound pool until such a policy exists and rebinds whenever
//! a policy of that name is created again.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use metricore_common::time::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MetricsError, MetricsResult};
use crate::flags::{MetricFlags, Outcome};
use crate::format;
use crate::metric::{Metric, MetricId, Owner};
use crate::policy::{DynamicPolicy, PolicyDefinition, PolicyId};
use crate::ports::{MetricReport, NoOpReportSink, NoOpScheduler, ReportSink, Scheduler};

/// Upper bounds on what a registry will allocate; `None` is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLimits {
    /// Live metrics across all collections
    pub max_metrics: Option<usize>,
    /// Live dynamic policies
    pub max_policies: Option<usize>,
    /// Distinct bucket names per histogram metric
    pub max_buckets_per_metric: Option<usize>,
}

/// Builder for [`Registry`]
///
/// Unset collaborators default to the system clock, a discarding sink and a
/// scheduler that never fires.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn ReportSink>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    limits: RegistryLimits,
}

impl RegistryBuilder {
    /// Time source for event and dump timestamps
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Destination for periodic reports
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Periodic dump arrangement
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Allocation limits
    #[must_use]
    pub fn limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build an empty registry
    pub fn build(self) -> Registry {
        Registry {
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            sink: self.sink.unwrap_or_else(|| Arc::new(NoOpReportSink)),
            scheduler: self.scheduler.unwrap_or_else(|| Arc::new(NoOpScheduler)),
            limits: self.limits,
            metrics: HashMap::new(),
            policies: Vec::new(),
            unbound: BTreeSet::new(),
            next_metric: 0,
            next_policy: 0,
        }
    }
}

/// Process-wide metrics state, passed explicitly to every operation
///
/// Dropping the registry tears it down: scheduled dumps are cancelled and
/// every metric is released.
pub struct Registry {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn ReportSink>,
    scheduler: Arc<dyn Scheduler>,
    limits: RegistryLimits,
    metrics: HashMap<MetricId, Metric>,
    policies: Vec<DynamicPolicy>,
    unbound: BTreeSet<MetricId>,
    next_metric: u64,
    next_policy: u64,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("metrics", &self.metrics.len())
            .field("policies", &self.policies.len())
            .field("unbound", &self.unbound.len())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    fn now_us(&self) -> u64 {
        self.clock.micros_since_epoch()
    }

    // ------------------------------------------------------------------
    // Metric lifecycle
    // ------------------------------------------------------------------

    /// Create a metric in the unbound pool
    ///
    /// Statistical metrics stamp their first event with the current time;
    /// histogram metrics start with no buckets and no timestamps.
    ///
    /// # Errors
    /// Returns [`MetricsError::CapacityExhausted`] when `max_metrics` is
    /// reached, or [`MetricsError::Allocation`] when memory for the record
    /// cannot be reserved. Nothing is registered on failure.
    pub fn create_metric(&mut self, name: &str, flags: MetricFlags) -> MetricsResult<MetricId> {
        if let Some(limit) = self.limits.max_metrics {
            if self.metrics.len() >= limit {
                return Err(MetricsError::CapacityExhausted { resource: "metric", limit });
            }
        }

        let mut owned = String::new();
        owned.try_reserve_exact(name.len()).map_err(MetricsError::allocation("metric"))?;
        owned.push_str(name);
        self.metrics.try_reserve(1).map_err(MetricsError::allocation("metric"))?;

        let id = MetricId(self.next_metric);
        self.next_metric += 1;

        let metric = Metric::new(owned, flags, self.now_us());
        self.metrics.insert(id, metric);
        self.unbound.insert(id);

        debug!(metric = name, %id, ?flags, "metric created");
        Ok(id)
    }

    /// Create a metric that wants the policy named `policy_name`
    ///
    /// The metric is bound right away when the policy exists; otherwise it
    /// waits in the unbound pool and is bound as soon as a policy with that
    /// name is created.
    ///
    /// # Errors
    /// Same as [`Registry::create_metric`].
    pub fn create_metric_for(
        &mut self,
        name: &str,
        flags: MetricFlags,
        policy_name: &str,
    ) -> MetricsResult<MetricId> {
        let id = self.create_metric(name, flags)?;
        if let Some(metric) = self.metrics.get_mut(&id) {
            metric.set_preferred_policy(Some(policy_name.to_owned()));
        }

        match self.policy_index(policy_name) {
            Some(index) => {
                let policy = self.policies[index].id();
                self.detach(id);
                self.attach(id, Owner::Policy(policy));
            }
            None => debug!(metric = name, policy = policy_name, "policy not available yet"),
        }

        Ok(id)
    }

    /// Remove a metric from its collection and either re-home or free it
    ///
    /// With `keep` the metric moves into the unbound pool with its state
    /// untouched. Without `keep` the metric and its buckets are released.
    ///
    /// # Errors
    /// Returns [`MetricsError::UnknownMetric`] for a handle that is not live.
    pub fn destroy_metric(&mut self, id: MetricId, keep: bool) -> MetricsResult<()> {
        if !self.metrics.contains_key(&id) {
            return Err(MetricsError::UnknownMetric(id));
        }

        self.detach(id);
        if keep {
            self.attach(id, Owner::Unbound);
            return Ok(());
        }

        if let Some(metric) = self.metrics.remove(&id) {
            debug!(metric = metric.name(), %id, "metric destroyed");
        }
        Ok(())
    }

    /// Move a metric into the member set of the policy named `policy_name`
    ///
    /// The name is also remembered as the metric's preferred policy, so the
    /// metric rebinds if that policy is later removed and re-created.
    ///
    /// # Errors
    /// Returns [`MetricsError::PolicyNotFound`] when no policy has that name
    /// and [`MetricsError::UnknownMetric`] for a handle that is not live. The
    /// metric's membership is unchanged on error.
    pub fn switch_policy(&mut self, id: MetricId, policy_name: &str) -> MetricsResult<PolicyId> {
        let Some(index) = self.policy_index(policy_name) else {
            warn!(%id, policy = policy_name, "switch to unknown policy rejected");
            return Err(MetricsError::PolicyNotFound(policy_name.to_owned()));
        };
        let policy = self.policies[index].id();

        let metric = self.metrics.get_mut(&id).ok_or(MetricsError::UnknownMetric(id))?;
        metric.set_preferred_policy(Some(policy_name.to_owned()));

        self.detach(id);
        self.attach(id, Owner::Policy(policy));
        debug!(%id, policy = policy_name, "metric switched policy");
        Ok(policy)
    }

    /// Take `id` out of the collection its owner tag names
    fn detach(&mut self, id: MetricId) {
        let Some(owner) = self.metrics.get(&id).map(Metric::owner) else {
            return;
        };

        match owner {
            Owner::Unbound => {
                self.unbound.remove(&id);
            }
            Owner::Policy(policy) => {
                if let Some(policy) = self.policies.iter_mut().find(|p| p.id() == policy) {
                    policy.remove(id);
                }
            }
        }
    }

    /// Insert a detached `id` into `owner` and retag it
    fn attach(&mut self, id: MetricId, owner: Owner) {
        let Some(metric) = self.metrics.get_mut(&id) else {
            return;
        };
        metric.set_owner(owner);

        match owner {
            Owner::Unbound => {
                self.unbound.insert(id);
            }
            Owner::Policy(policy) => {
                if let Some(policy) = self.policies.iter_mut().find(|p| p.id() == policy) {
                    policy.insert(id);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Policy lifecycle
    // ------------------------------------------------------------------

    /// Create one dynamic policy per definition
    ///
    /// Each policy with a non-zero interval gets a periodic dump registered
    /// with the scheduler, first firing one interval from now. Unbound
    /// metrics that prefer a newly created policy are bound to it.
    ///
    /// # Errors
    /// Stops at the first definition that cannot be created. Policies
    /// created earlier in the same call stay registered; the failing one is
    /// not.
    pub fn create_policies<I>(&mut self, definitions: I) -> MetricsResult<Vec<PolicyId>>
    where
        I: IntoIterator<Item = Arc<PolicyDefinition>>,
    {
        let mut created = Vec::new();

        for definition in definitions {
            if let Some(limit) = self.limits.max_policies {
                if self.policies.len() >= limit {
                    return Err(MetricsError::CapacityExhausted { resource: "policy", limit });
                }
            }
            self.policies.try_reserve(1).map_err(MetricsError::allocation("policy"))?;

            let id = PolicyId(self.next_policy);
            self.next_policy += 1;
            let mut policy = DynamicPolicy::new(id, Arc::clone(&definition));

            if definition.is_scheduled() {
                let interval = definition.report_interval;
                let handle = self.scheduler.schedule_periodic(id, interval, interval)?;
                policy.set_schedule(handle);
            }

            self.policies.push(policy);
            let rebound = self.rebind_waiting(id, &definition.name);

            info!(
                policy = %definition.name,
                %id,
                interval_us = u64::try_from(definition.report_interval.as_micros()).unwrap_or(u64::MAX),
                rebound,
                "policy created"
            );
            created.push(id);
        }

        Ok(created)
    }

    /// Bind every unbound metric that prefers `name` to `policy`
    fn rebind_waiting(&mut self, policy: PolicyId, name: &str) -> usize {
        let waiting: Vec<MetricId> = self
            .unbound
            .iter()
            .copied()
            .filter(|id| {
                self.metrics.get(id).and_then(Metric::preferred_policy).is_some_and(|p| p == name)
            })
            .collect();

        for &id in &waiting {
            self.detach(id);
            self.attach(id, Owner::Policy(policy));
        }
        waiting.len()
    }

    fn policy_index(&self, name: &str) -> Option<usize> {
        self.policies.iter().position(|p| p.name() == name)
    }

    /// First policy whose definition carries `name`
    pub fn policy_by_name(&self, name: &str) -> Option<PolicyId> {
        self.policy_index(name).map(|index| self.policies[index].id())
    }

    /// Destroy a dynamic policy
    ///
    /// The scheduled dump is cancelled before any member is touched. With
    /// `keep` the members move to the unbound pool; without it they are
    /// destroyed.
    ///
    /// # Errors
    /// Returns [`MetricsError::UnknownPolicy`] for a handle that is not live.
    pub fn destroy_policy(&mut self, id: PolicyId, keep: bool) -> MetricsResult<()> {
        let index = self
            .policies
            .iter()
            .position(|p| p.id() == id)
            .ok_or(MetricsError::UnknownPolicy(id))?;

        if let Some(handle) = self.policies[index].take_schedule() {
            self.scheduler.cancel(handle);
        }

        let mut policy = self.policies.remove(index);
        let members = policy.take_members();
        let member_count = members.len();

        for member in members {
            if keep {
                self.attach(member, Owner::Unbound);
            } else {
                self.metrics.remove(&member);
            }
        }

        info!(policy = policy.name(), %id, keep, members = member_count, "policy destroyed");
        Ok(())
    }

    /// Swap the active policy set for `definitions`
    ///
    /// Every current policy is destroyed with keep semantics, then the new
    /// definitions are created; metrics rebind to the new policies by their
    /// preferred policy name.
    ///
    /// # Errors
    /// Same as [`Registry::create_policies`]; the old policies are already
    /// gone when creation fails.
    pub fn reload_policies<I>(&mut self, definitions: I) -> MetricsResult<Vec<PolicyId>>
    where
        I: IntoIterator<Item = Arc<PolicyDefinition>>,
    {
        let current: Vec<PolicyId> = self.policies.iter().map(DynamicPolicy::id).collect();
        for id in current {
            self.destroy_policy(id, true)?;
        }
        self.create_policies(definitions)
    }

    /// Destroy every policy and every metric
    ///
    /// Policies go first, without keep, then whatever is left in the unbound
    /// pool. Afterwards nothing allocated through this registry remains.
    pub fn destroy(&mut self) {
        let policies: Vec<PolicyId> = self.policies.iter().map(DynamicPolicy::id).collect();
        for id in policies {
            // Ids come from the live list, so lookup cannot fail
            let _ = self.destroy_policy(id, false);
        }

        for id in std::mem::take(&mut self.unbound) {
            self.metrics.remove(&id);
        }

        debug_assert!(self.metrics.is_empty(), "metric outlived registry teardown");
        self.metrics.clear();
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Record a go / no-go event with a value
    ///
    /// Accepts a `MetricId` or an `Option<MetricId>`; an absent or stale
    /// handle is a silent no-op so callers can record unconditionally.
    ///
    /// # Panics
    /// Panics when the metric is a histogram.
    pub fn record_event(&mut self, metric: impl Into<Option<MetricId>>, outcome: Outcome, value: u64) {
        let Some(id) = metric.into() else {
            return;
        };
        let now_us = self.now_us();
        if let Some(metric) = self.metrics.get_mut(&id) {
            metric.record(outcome, value, now_us);
        }
    }

    /// Count one occurrence of `bucket` in a histogram metric
    ///
    /// # Errors
    /// Returns [`MetricsError::UnknownMetric`] for a handle that is not live,
    /// or the bucket store's allocation error; the store is unchanged then.
    ///
    /// # Panics
    /// Panics when the metric is not a histogram or the bucket name is longer
    /// than [`MAX_BUCKET_NAME_LEN`](crate::MAX_BUCKET_NAME_LEN) bytes.
    pub fn bump(&mut self, id: MetricId, bucket: &str) -> MetricsResult<()> {
        let now_us = self.now_us();
        let max_buckets = self.limits.max_buckets_per_metric;
        let metric = self.metrics.get_mut(&id).ok_or(MetricsError::UnknownMetric(id))?;
        metric.bump(bucket, now_us, max_buckets)
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Periodic dump for one policy, invoked by the scheduler
    ///
    /// Every member with activity since its last dump is reported to the
    /// sink, then its activity marker is reset (and its store too, when the
    /// policy asks for it). Idle members are skipped entirely. An unknown
    /// policy is ignored, so a tick racing a cancellation is harmless.
    ///
    /// Returns the number of reports emitted.
    pub fn run_periodic(&mut self, policy: PolicyId) -> usize {
        let now_us = self.now_us();
        let Self { policies, metrics, sink, .. } = self;

        let Some(policy) = policies.iter().find(|p| p.id() == policy) else {
            return 0;
        };
        let definition = policy.definition();

        let mut reported = 0;
        for id in policy.members() {
            let Some(metric) = metrics.get_mut(&id) else {
                continue;
            };
            if !metric.has_unreported_activity() {
                continue;
            }

            sink.report(&MetricReport {
                id,
                metric,
                policy: Some(&**definition),
                reported_at_us: now_us,
            });
            metric.mark_dumped(now_us);
            if definition.reset_after_dump {
                metric.reset_store();
            }
            reported += 1;
        }

        reported
    }

    /// Report every unbound metric to the sink, regardless of activity
    ///
    /// Diagnostic only: timestamps and stores are left untouched.
    #[cfg(feature = "debug-dump")]
    pub fn dump_unbound(&self) -> usize {
        let now_us = self.now_us();
        let mut reported = 0;
        for &id in &self.unbound {
            if let Some(metric) = self.metrics.get(&id) {
                self.sink.report(&MetricReport { id, metric, policy: None, reported_at_us: now_us });
                reported += 1;
            }
        }
        reported
    }

    /// Render a metric into `buf`; see [`format::format_metric`]
    ///
    /// # Errors
    /// Returns [`MetricsError::UnknownMetric`] for a handle that is not live.
    pub fn format_metric(&self, id: MetricId, buf: &mut [u8]) -> MetricsResult<usize> {
        let metric = self.metrics.get(&id).ok_or(MetricsError::UnknownMetric(id))?;
        Ok(format::format_metric(metric, self.now_us(), buf))
    }

    /// Render a metric into a string; `None` for a handle that is not live
    pub fn render_metric(&self, id: MetricId) -> Option<String> {
        self.metrics.get(&id).map(|metric| format::render_metric(metric, self.now_us()))
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Look up a live metric
    pub fn metric(&self, id: MetricId) -> Option<&Metric> {
        self.metrics.get(&id)
    }

    /// Every live metric, bound or not, in no particular order
    pub fn metrics(&self) -> impl Iterator<Item = (MetricId, &Metric)> + '_ {
        self.metrics.iter().map(|(&id, metric)| (id, metric))
    }

    /// Look up a live policy
    pub fn policy(&self, id: PolicyId) -> Option<&DynamicPolicy> {
        self.policies.iter().find(|p| p.id() == id)
    }

    /// Live policies in creation order
    pub fn policies(&self) -> impl Iterator<Item = &DynamicPolicy> + '_ {
        self.policies.iter()
    }

    /// Metrics in the unbound pool, in handle order
    pub fn unbound(&self) -> impl Iterator<Item = MetricId> + '_ {
        self.unbound.iter().copied()
    }

    /// Number of live metrics
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Number of live policies
    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// Configured allocation limits
    pub fn limits(&self) -> RegistryLimits {
        self.limits
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.destroy();
    }
}
