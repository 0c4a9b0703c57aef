//! Tokio-backed implementation of the scheduler port

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use metricore_common::time::timer::{recurring_after, TimerHandle};
use metricore_core::{MetricsError, MetricsResult, PolicyId, Registry, ScheduleHandle, Scheduler};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, error, trace};

use crate::errors::{InfraError, InfraResult};

/// The registry behind one coarse lock, as shared with timer tasks
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Scheduler that runs each policy's dump on a recurring tokio task
///
/// Timer tasks only hold a weak reference to the registry: dropping the last
/// strong reference tears the registry down, which cancels every timer.
#[derive(Debug)]
pub struct TokioScheduler {
    runtime: Handle,
    registry: OnceLock<Weak<Mutex<Registry>>>,
    timers: Mutex<HashMap<ScheduleHandle, TimerHandle>>,
    next_handle: AtomicU64,
}

impl TokioScheduler {
    /// Create a scheduler that spawns its timers on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            registry: OnceLock::new(),
            timers: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Create a scheduler on the runtime of the calling context
    ///
    /// # Errors
    /// Returns [`InfraError::Runtime`] outside a tokio runtime.
    pub fn current() -> InfraResult<Self> {
        Handle::try_current().map(Self::new).map_err(|e| InfraError::Runtime(e.to_string()))
    }

    /// Attach the registry that ticks should dump
    ///
    /// Only the first attachment takes effect; later calls return `false`.
    pub fn attach(&self, registry: &SharedRegistry) -> bool {
        self.registry.set(Arc::downgrade(registry)).is_ok()
    }

    /// Number of live timers
    pub fn active_timers(&self) -> usize {
        self.timers.lock().len()
    }

    /// Cancel every live timer
    pub fn cancel_all(&self) {
        let timers = std::mem::take(&mut *self.timers.lock());
        for (handle, timer) in timers {
            timer.cancel();
            trace!(handle = handle.0, "timer cancelled");
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_periodic(
        &self,
        policy: PolicyId,
        initial_delay: Duration,
        interval: Duration,
    ) -> MetricsResult<ScheduleHandle> {
        let Some(registry) = self.registry.get().cloned() else {
            error!(%policy, "scheduler used before a registry was attached");
            return Err(MetricsError::Schedule {
                policy: policy.to_string(),
                reason: "no registry attached to the scheduler".into(),
            });
        };

        let handle = ScheduleHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let timer = recurring_after(&self.runtime, initial_delay, interval, move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let reported = registry.lock().run_periodic(policy);
            trace!(%policy, reported, "periodic dump");
        });

        self.timers.lock().insert(handle, timer);
        debug!(%policy, handle = handle.0, ?interval, "periodic dump scheduled");
        Ok(handle)
    }

    fn cancel(&self, handle: ScheduleHandle) {
        if let Some(timer) = self.timers.lock().remove(&handle) {
            timer.cancel();
            debug!(handle = handle.0, "periodic dump cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
