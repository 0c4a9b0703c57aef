//! Timer-driven scheduling of periodic policy dumps
//!
//! [`TokioScheduler`] implements the core [`Scheduler`](metricore_core::Scheduler)
//! port with one recurring tokio task per scheduled policy. Each tick locks
//! the shared registry and runs the policy's dump, so dumps are serialized
//! with every other registry mutation.

pub mod tokio_scheduler;

pub use tokio_scheduler::{SharedRegistry, TokioScheduler};
