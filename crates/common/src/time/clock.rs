//! Time source abstraction
//!
//! The metrics registry never reads the system clock directly; it asks a
//! [`Clock`] so tests can drive timestamps deterministically.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use metricore_common::time::{Clock, MockClock, SystemClock};
//!
//! // Use system clock in production
//! let clock = SystemClock;
//! assert!(clock.micros_since_epoch() > 0);
//!
//! // Use mock clock in tests
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::from_secs(5));
//! assert_eq!(mock.now().duration_since(start), Duration::from_secs(5));
//! ```

// Poisoned mock mutexes abort the test that poisoned them
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable testing
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Get milliseconds since UNIX epoch
    fn millis_since_epoch(&self) -> u64 {
        let millis = self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        u64::try_from(millis).unwrap_or(u64::MAX)
    }

    /// Get microseconds since UNIX epoch
    ///
    /// Metric timestamps use this resolution. A clock set before the epoch
    /// reads as zero.
    fn micros_since_epoch(&self) -> u64 {
        let micros = self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_micros();
        u64::try_from(micros).unwrap_or(u64::MAX)
    }
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed time, so a test can hand one clone to the
/// registry and keep another to advance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use metricore_common::time::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let shared = clock.clone();
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(shared.elapsed(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed_us: Arc<AtomicU64>,
    base_system_time: SystemTime,
}

impl MockClock {
    /// Create a new mock clock anchored at the current real time
    pub fn new() -> Self {
        Self::at(SystemTime::now())
    }

    /// Create a mock clock whose wall-clock reading starts at `base`
    pub fn at(base: SystemTime) -> Self {
        Self {
            start: Instant::now(),
            elapsed_us: Arc::new(AtomicU64::new(0)),
            base_system_time: base,
        }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        self.elapsed_us.fetch_add(saturating_micros(duration), Ordering::SeqCst);
    }

    /// Set the mock clock to a specific elapsed time
    pub fn set_elapsed(&self, duration: Duration) {
        self.elapsed_us.store(saturating_micros(duration), Ordering::SeqCst);
    }

    /// Get the current elapsed time
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_us.load(Ordering::SeqCst))
    }
}

fn saturating_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base_system_time + self.elapsed()
    }
}
