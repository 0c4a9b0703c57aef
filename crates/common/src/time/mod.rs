//! Time utilities and abstractions
//!
//! - **[`clock`]**: Real and mock time sources
//! - **[`humanize`]**: Unit-scaled rendering of counts and microsecond
//!   durations
//! - **[`timer`]**: Cancellable recurring timers (`runtime` feature)
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use metricore_common::time::{humanize, Clock, MockClock, UnitSchema};
//!
//! assert_eq!(humanize(1_500, UnitSchema::Si), "1.500K");
//! assert_eq!(humanize(200, UnitSchema::Micros), "200us");
//!
//! let clock = MockClock::new();
//! let before = clock.micros_since_epoch();
//! clock.advance(Duration::from_millis(5));
//! assert_eq!(clock.micros_since_epoch() - before, 5_000);
//! ```

pub mod clock;
pub mod humanize;
#[cfg(feature = "runtime")]
pub mod timer;

// Re-export commonly used items
pub use clock::{Clock, MockClock, SystemClock};
pub use humanize::{humanize, write_humanized, UnitSchema};
#[cfg(feature = "runtime")]
pub use timer::{recurring_after, TimerHandle};
