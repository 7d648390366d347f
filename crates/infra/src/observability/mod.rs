//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and tests call
//! [`init_tracing`] once to decide where they go.

use std::str::FromStr;

use gametest_domain::{impl_domain_enum_conversions, GametestError, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "GAMETEST_LOG";
/// Environment variable selecting the output format (`text` or `json`).
pub const LOG_FORMAT_ENV_VAR: &str = "GAMETEST_LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "gametest=info";

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl_domain_enum_conversions!(LogFormat {
    Text => "text",
    Json => "json",
});

impl LogFormat {
    /// Format named by `GAMETEST_LOG_FORMAT`, text when unset or unknown.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV_VAR)
            .ok()
            .and_then(|raw| Self::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

/// Filter from `GAMETEST_LOG`, falling back to `gametest=info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber.
///
/// # Errors
/// Returns `GametestError::Internal` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let installed = match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
    };

    installed.map_err(|err| {
        GametestError::Internal(format!("failed to install tracing subscriber: {err}"))
    })
}
