//! Shared fixtures for `metricore-core` integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use metricore_common::time::MockClock;
use metricore_core::testing::{CollectingSink, ManualScheduler};
use metricore_core::{PolicyDefinition, Registry, RegistryLimits};

/// Fixed wall-clock origin so rendered timestamps are stable
pub const EPOCH_OFFSET: Duration = Duration::from_secs(1_700_000_000);

/// A registry wired to controllable collaborators
pub struct Harness {
    pub registry: Registry,
    pub clock: MockClock,
    pub sink: Arc<CollectingSink>,
    pub scheduler: Arc<ManualScheduler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_limits(RegistryLimits::default())
    }

    pub fn with_limits(limits: RegistryLimits) -> Self {
        let clock = MockClock::at(SystemTime::UNIX_EPOCH + EPOCH_OFFSET);
        let sink = Arc::new(CollectingSink::default());
        let scheduler = Arc::new(ManualScheduler::default());
        let registry = Registry::builder()
            .clock(Arc::new(clock.clone()))
            .sink(sink.clone())
            .scheduler(scheduler.clone())
            .limits(limits)
            .build();
        Self { registry, clock, sink, scheduler }
    }

    /// Advance the clock, then fire every live timer once
    pub fn tick(&mut self, after: Duration) -> usize {
        self.clock.advance(after);
        self.scheduler.tick(&mut self.registry)
    }
}

pub fn policy(name: &str, interval_us: u64) -> Arc<PolicyDefinition> {
    Arc::new(PolicyDefinition::new(name, Duration::from_micros(interval_us)))
}
