//! Error types used throughout the sandbox

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gametest sandbox
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GametestError {
    /// Connection refused, reset, or any other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Missing or malformed variables, secrets, or sandbox settings.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid tick interval {0}: tick_interval can't be smaller than 1")]
    InvalidInterval(i64),

    /// A secret-valued header referenced a handle with no plaintext.
    #[error("Unresolved secret: {0}")]
    UnresolvedSecret(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for sandbox operations
pub type Result<T> = std::result::Result<T, GametestError>;
