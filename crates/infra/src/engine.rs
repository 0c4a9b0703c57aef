//! Wiring of a registry to its runtime collaborators
//!
//! [`MetricsEngine`] owns the shared registry, a [`TokioScheduler`] driving
//! its policies, and by default a [`TracingReportSink`].
//!
//! # Example
//!
//! ```no_run
//! use metricore_core::{MetricFlags, Outcome};
//! use metricore_infra::{config, MetricsEngine};
//!
//! # async fn example() -> Result<(), metricore_infra::InfraError> {
//! let config = config::load()?;
//! let engine = MetricsEngine::builder().config(config).build()?;
//!
//! let rx = engine.lock().create_metric_for("rx_bytes", MetricFlags::empty(), "default")?;
//! engine.lock().record_event(rx, Outcome::Go, 1500);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use metricore_common::time::Clock;
use metricore_core::{PolicyId, Registry, ReportSink};
use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tracing::info;

use crate::config::MetricsConfig;
use crate::errors::{InfraError, InfraResult};
use crate::scheduling::{SharedRegistry, TokioScheduler};
use crate::sinks::TracingReportSink;

/// Builder for [`MetricsEngine`]
#[derive(Debug, Default)]
pub struct MetricsEngineBuilder {
    config: MetricsConfig,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn ReportSink>>,
    runtime: Option<Handle>,
}

impl MetricsEngineBuilder {
    /// Policies, limits and report settings to start with
    #[must_use]
    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source; the system clock by default
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Report destination; a [`TracingReportSink`] by default
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Runtime the timers run on; the calling context's by default
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate the configuration, build the registry and create the
    /// configured policies
    ///
    /// # Errors
    /// Returns [`InfraError::Config`] for an invalid configuration,
    /// [`InfraError::Runtime`] when no runtime is given and none is current,
    /// and [`InfraError::Metrics`] when a policy cannot be created.
    pub fn build(self) -> InfraResult<MetricsEngine> {
        let Self { config, clock, sink, runtime } = self;
        config.validate()?;

        let scheduler = Arc::new(match runtime {
            Some(runtime) => TokioScheduler::new(runtime),
            None => TokioScheduler::current()?,
        });
        let sink = sink
            .unwrap_or_else(|| Arc::new(TracingReportSink::new(config.report.format_buffer_len)));

        let mut builder = Registry::builder().sink(sink).scheduler(scheduler.clone()).limits(config.limits);
        if let Some(clock) = clock {
            builder = builder.clock(clock);
        }

        let registry: SharedRegistry = Arc::new(Mutex::new(builder.build()));
        scheduler.attach(&registry);
        registry.lock().create_policies(config.policy_definitions())?;

        info!(
            policies = config.policies.len(),
            timers = scheduler.active_timers(),
            "metrics engine started"
        );
        Ok(MetricsEngine { registry, scheduler })
    }
}

/// A registry whose policies dump on tokio timers
#[derive(Debug)]
pub struct MetricsEngine {
    registry: SharedRegistry,
    scheduler: Arc<TokioScheduler>,
}

impl MetricsEngine {
    /// Start building an engine
    pub fn builder() -> MetricsEngineBuilder {
        MetricsEngineBuilder::default()
    }

    /// Build an engine from `config` on the current runtime
    ///
    /// # Errors
    /// See [`MetricsEngineBuilder::build`].
    pub fn from_config(config: MetricsConfig) -> InfraResult<Self> {
        Self::builder().config(config).build()
    }

    /// The shared registry, for handing to other components
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Lock the registry for a sequence of operations
    ///
    /// Timer ticks wait while the guard is held.
    pub fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock()
    }

    /// Number of running policy timers
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_timers()
    }

    /// Replace the policy set with the one in `config`
    ///
    /// Metrics keep their state and rebind by preferred policy name.
    ///
    /// # Errors
    /// Returns [`InfraError::Config`] for an invalid configuration, leaving
    /// the current policies in place, or [`InfraError::Metrics`] when a new
    /// policy cannot be created.
    pub fn reload(&self, config: &MetricsConfig) -> InfraResult<Vec<PolicyId>> {
        config.validate()?;
        let ids = self.registry.lock().reload_policies(config.policy_definitions())?;
        info!(policies = ids.len(), "policies reloaded");
        Ok(ids)
    }

    /// Tear the registry down: cancel every timer and release every metric
    pub fn shutdown(self) {
        self.registry.lock().destroy();
        info!("metrics engine stopped");
    }
}
