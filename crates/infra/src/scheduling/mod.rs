//! Wall-clock driving for the tick scheduler
//!
//! The core [`TickScheduler`](gametest_core::TickScheduler) only advances
//! when asked to. [`TickDriver`] asks once per tick period on a Tokio task,
//! with explicit lifecycle management:
//! - start/stop with join handles
//! - cancellation token support
//! - timeout on the join during stop

pub mod error;
pub mod tick_driver;

pub use error::{SchedulerError, SchedulerResult};
pub use tick_driver::TickDriver;
