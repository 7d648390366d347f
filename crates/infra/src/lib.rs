//! # Gametest Infrastructure
//!
//! Infrastructure implementations of the core ports and the sandbox owner.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - The wall-clock tick driver
//! - Configuration, variables, and secrets file loading
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `gametest-core`
//! - Contains all "impure" code (network, files, timers)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod sandbox;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
pub use sandbox::Sandbox;
pub use scheduling::{SchedulerError, SchedulerResult, TickDriver};
