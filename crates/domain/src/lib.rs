//! # Gametest Domain
//!
//! Data types shared by the gametest sandbox crates.
//!
//! This crate contains:
//! - HTTP request/response descriptors and the secret handle token
//! - Scheduler identifiers and task kinds
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other gametest crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
