//! Scheduler error types

use gametest_domain::GametestError;
use thiserror::Error;

use crate::errors::InfraError;

/// Tick driver errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Driver is already running
    #[error("Tick driver already running")]
    AlreadyRunning,

    /// Driver is not running
    #[error("Tick driver not running")]
    NotRunning,

    #[error("Tick period must be at least 1ms")]
    InvalidPeriod,

    /// Start was called outside a Tokio runtime
    #[error("No Tokio runtime available to start the tick driver")]
    NoRuntime,

    /// Operation timed out
    #[error("Operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        Self(GametestError::Scheduler(err.to_string()))
    }
}

impl From<SchedulerError> for GametestError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for driver operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
