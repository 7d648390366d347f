//! # Gametest Core
//!
//! Sandbox logic with no I/O of its own.
//!
//! This crate contains:
//! - `SecretStore`: opaque secret handles and the private plaintext arena
//! - `ServerVariables`: read-only named configuration values
//! - `HttpPipeline`: secret resolution and response assembly on top of the
//!   `HttpTransport` port
//! - `TickScheduler`: the virtual tick counter and callback registry
//!
//! ## Architecture Principles
//! - Only depends on `gametest-domain`
//! - No sockets, timers, or file access; those live in `gametest-infra`
//! - All external dependencies via traits

pub mod http;
pub mod scheduling;
pub mod secrets;
pub mod variables;

pub use http::ports::{
    ChunkedBody, HttpTransport, ResolvedHeader, ResolvedRequest, ResponseBody, TransportResponse,
};
pub use http::{HttpPipeline, PipelineConfig};
pub use scheduling::{FailureHook, TaskCallback, TickScheduler};
pub use secrets::SecretStore;
pub use variables::ServerVariables;
