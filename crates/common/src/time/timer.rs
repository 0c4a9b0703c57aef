//! Cancellable recurring timers
//!
//! Provides the periodic tick that drives policy dumps. Cancelling a handle
//! guarantees the callback does not run again, even if a tick is already
//! pending.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// A timer handle that can be used to cancel a timer
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    task: Option<Arc<JoinHandle<()>>>,
}

impl TimerHandle {
    /// Create a detached handle with no task behind it
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)), task: None }
    }

    /// Cancel the timer
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `callback` every `period`, first firing after `initial_delay`
///
/// The task is spawned on `runtime`; ticks missed while the callback runs
/// are delayed rather than bunched up.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use metricore_common::time::timer::recurring_after;
///
/// #[tokio::main]
/// async fn main() {
///     let handle = recurring_after(
///         &tokio::runtime::Handle::current(),
///         Duration::ZERO,
///         Duration::from_secs(1),
///         || println!("Tick!"),
///     );
///
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     handle.cancel();
/// }
/// ```
pub fn recurring_after<F>(
    runtime: &Handle,
    initial_delay: Duration,
    period: Duration,
    mut callback: F,
) -> TimerHandle
where
    F: FnMut() + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let task = runtime.spawn(async move {
        let mut ticks = interval_at(Instant::now() + initial_delay, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            if flag.load(Ordering::SeqCst) {
                break;
            }
            callback();
        }
        tracing::trace!(?period, "recurring timer stopped");
    });

    TimerHandle { cancelled, task: Some(Arc::new(task)) }
}

#[cfg(test)]
mod tests {
    //! Unit tests for time::timer.
    use std::sync::atomic::AtomicU32;

    use super::*;

    /// Validates `TimerHandle::new` behavior for the timer handle cancel
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `!handle.is_cancelled()` evaluates to true.
    /// - Ensures `handle.is_cancelled()` evaluates to true.
    #[tokio::test]
    async fn test_timer_handle_cancel() {
        let handle = TimerHandle::new();
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    /// Validates `recurring_after` for the recurring scenario.
    ///
    /// Assertions:
    /// - Ensures `(2..=4).contains(&count)` evaluates to true.
    #[tokio::test]
    async fn test_recurring() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let handle = recurring_after(
            &Handle::current(),
            Duration::from_millis(10),
            Duration::from_millis(10),
            move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(35)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Should have fired 3 times (at 10ms, 20ms, 30ms)
        let count = counter.load(Ordering::SeqCst);
        assert!((2..=4).contains(&count)); // Allow some timing variance
    }

    /// Validates that a cancelled recurring timer never fires.
    ///
    /// Assertions:
    /// - Confirms `counter.load(Ordering::SeqCst)` equals `0`.
    #[tokio::test]
    async fn test_recurring_cancelled_before_first_tick() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let handle = recurring_after(
            &Handle::current(),
            Duration::from_millis(30),
            Duration::from_millis(10),
            move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }
}
