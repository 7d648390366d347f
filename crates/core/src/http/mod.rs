//! HTTP request/response pipeline
//!
//! `ports` defines the transport boundary; `pipeline` holds the secret
//! resolution and response assembly logic that runs on top of it.

pub mod pipeline;
pub mod ports;

pub use pipeline::{timeout_from_seconds, HttpPipeline, PipelineConfig};
