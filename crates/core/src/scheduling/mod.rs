//! Tick-based cooperative scheduling
//!
//! The scheduler itself is clock-free: each call to
//! [`TickScheduler::run_pass`] processes one virtual tick. A periodic driver
//! (see `gametest-infra`) calls it on a fixed wall-clock period.

pub mod tick_scheduler;

pub use tick_scheduler::{FailureHook, TaskCallback, TickScheduler};
