//! The metric record and its ownership tag

use std::fmt;

use crate::aggregate::AggregateStore;
use crate::buckets::BucketStore;
use crate::error::MetricsResult;
use crate::flags::{MetricFlags, MetricKind, Outcome};
use crate::policy::PolicyId;

/// Opaque handle to a metric owned by a [`Registry`](crate::Registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricId(pub(crate) u64);

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "metric#{}", self.0)
    }
}

/// The collection a metric currently belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The registry's pool of metrics without a bound policy
    Unbound,
    /// A dynamic policy's member set
    Policy(PolicyId),
}

/// Accumulated state, fixed to one variant at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricStore {
    /// Go / no-go running statistics
    Aggregate(AggregateStore),
    /// Named occurrence buckets
    Histogram(BucketStore),
}

/// A named unit of measurement
///
/// Report sinks only ever see `&Metric`; every mutation goes through the
/// registry.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    flags: MetricFlags,
    store: MetricStore,
    first_event_us: Option<u64>,
    last_event_us: Option<u64>,
    last_dump_us: Option<u64>,
    owner: Owner,
    preferred_policy: Option<String>,
}

impl Metric {
    pub(crate) fn new(name: String, flags: MetricFlags, now_us: u64) -> Self {
        let (store, first_event_us) = match flags.kind() {
            MetricKind::Statistical => (MetricStore::Aggregate(AggregateStore::new()), Some(now_us)),
            MetricKind::Histogram => (MetricStore::Histogram(BucketStore::new()), None),
        };

        Self {
            name,
            flags,
            store,
            first_event_us,
            last_event_us: None,
            last_dump_us: None,
            owner: Owner::Unbound,
            preferred_policy: None,
        }
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation flags
    pub fn flags(&self) -> MetricFlags {
        self.flags
    }

    /// Store variant
    pub fn kind(&self) -> MetricKind {
        self.flags.kind()
    }

    /// Accumulated state
    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    /// Statistical state, for statistical metrics
    pub fn aggregate(&self) -> Option<&AggregateStore> {
        match &self.store {
            MetricStore::Aggregate(agg) => Some(agg),
            MetricStore::Histogram(_) => None,
        }
    }

    /// Bucket state, for histogram metrics
    pub fn histogram(&self) -> Option<&BucketStore> {
        match &self.store {
            MetricStore::Histogram(hist) => Some(hist),
            MetricStore::Aggregate(_) => None,
        }
    }

    /// First event since the last dump, in microseconds since the epoch
    pub fn first_event_us(&self) -> Option<u64> {
        self.first_event_us
    }

    /// Most recent event, cleared by a dump
    pub fn last_event_us(&self) -> Option<u64> {
        self.last_event_us
    }

    /// Time of the last dump
    pub fn last_dump_us(&self) -> Option<u64> {
        self.last_dump_us
    }

    /// Collection this metric currently belongs to
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Policy name this metric rebinds to when such a policy appears
    pub fn preferred_policy(&self) -> Option<&str> {
        self.preferred_policy.as_deref()
    }

    pub(crate) fn set_owner(&mut self, owner: Owner) {
        self.owner = owner;
    }

    pub(crate) fn set_preferred_policy(&mut self, policy: Option<String>) {
        self.preferred_policy = policy;
    }

    fn stamp_event(&mut self, now_us: u64) {
        self.last_event_us = Some(now_us);
        if self.first_event_us.is_none() {
            self.first_event_us = Some(now_us);
        }
    }

    /// # Panics
    /// Panics on a histogram metric.
    pub(crate) fn record(&mut self, outcome: Outcome, value: u64, now_us: u64) {
        let MetricStore::Aggregate(agg) = &mut self.store else {
            panic!("metric '{}' is a histogram; use bump", self.name);
        };
        agg.record(outcome, value);
        self.stamp_event(now_us);
    }

    /// # Panics
    /// Panics on a statistical metric or an oversized bucket name.
    pub(crate) fn bump(
        &mut self,
        bucket: &str,
        now_us: u64,
        max_buckets: Option<usize>,
    ) -> MetricsResult<()> {
        let MetricStore::Histogram(hist) = &mut self.store else {
            panic!("metric '{}' is not a histogram; use record_event", self.name);
        };
        hist.bump(bucket, max_buckets)?;
        self.stamp_event(now_us);
        Ok(())
    }

    /// Whether an event landed since the previous dump
    pub fn has_unreported_activity(&self) -> bool {
        self.last_event_us.is_some()
    }

    pub(crate) fn mark_dumped(&mut self, now_us: u64) {
        self.first_event_us = Some(now_us);
        self.last_dump_us = Some(now_us);
        self.last_event_us = None;
    }

    pub(crate) fn reset_store(&mut self) {
        match &mut self.store {
            MetricStore::Aggregate(agg) => agg.reset(),
            MetricStore::Histogram(hist) => hist.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates the initial state of both metric kinds.
    ///
    /// Assertions:
    /// - Confirms statistical metrics stamp the first event at creation.
    /// - Confirms histogram metrics start without timestamps.
    #[test]
    fn test_new_metric_state() {
        let stat = Metric::new("rx".into(), MetricFlags::MEAN, 10);
        assert_eq!(stat.first_event_us(), Some(10));
        assert_eq!(stat.aggregate().map(|a| a.branch(Outcome::Go).min), Some(u64::MAX));
        assert!(stat.histogram().is_none());
        assert_eq!(stat.owner(), Owner::Unbound);

        let hist = Metric::new("codes".into(), MetricFlags::HISTOGRAM, 10);
        assert_eq!(hist.first_event_us(), None);
        assert!(hist.histogram().is_some_and(BucketStore::is_empty));
        assert!(!hist.has_unreported_activity());
    }

    /// Validates the activity marker across record / dump cycles.
    ///
    /// Assertions:
    /// - Confirms a fresh statistical metric has nothing to report despite its
    ///   creation stamp.
    /// - Ensures a dump clears activity until the next event.
    #[test]
    fn test_activity_marker_cycle() {
        let mut metric = Metric::new("rx".into(), MetricFlags::empty(), 10);
        assert!(!metric.has_unreported_activity());

        metric.record(Outcome::Go, 1, 15);
        assert!(metric.has_unreported_activity());

        metric.mark_dumped(20);
        assert!(!metric.has_unreported_activity());
        assert_eq!(metric.first_event_us(), Some(20));
        assert_eq!(metric.last_dump_us(), Some(20));

        metric.record(Outcome::Go, 5, 30);
        assert!(metric.has_unreported_activity());
        assert_eq!(metric.last_event_us(), Some(30));
        assert_eq!(metric.first_event_us(), Some(20));
    }

    #[test]
    fn test_bump_stamps_first_event() {
        let mut metric = Metric::new("codes".into(), MetricFlags::HISTOGRAM, 0);
        metric.bump("200", 42, None).expect("bump");
        assert_eq!(metric.first_event_us(), Some(42));
        assert_eq!(metric.last_event_us(), Some(42));
    }

    #[test]
    #[should_panic(expected = "is a histogram")]
    fn test_record_on_histogram_panics() {
        let mut metric = Metric::new("codes".into(), MetricFlags::HISTOGRAM, 0);
        metric.record(Outcome::Go, 1, 1);
    }

    #[test]
    #[should_panic(expected = "is not a histogram")]
    fn test_bump_on_statistical_panics() {
        let mut metric = Metric::new("rx".into(), MetricFlags::empty(), 0);
        let _ = metric.bump("200", 1, None);
    }

    #[test]
    fn test_reset_store() {
        let mut metric = Metric::new("rx".into(), MetricFlags::empty(), 0);
        metric.record(Outcome::NoGo, 9, 1);
        metric.reset_store();
        assert!(metric.aggregate().is_some_and(AggregateStore::is_empty));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(MetricId(7).to_string(), "metric#7");
    }
}
