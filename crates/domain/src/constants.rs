//! Sandbox constants
//!
//! Centralized location for the defaults shared by every crate.

// Tick scheduler
pub const DEFAULT_TICK_PERIOD_MS: u64 = 20;
pub const DEFAULT_TICK_DELAY: i64 = 1;
pub const DEFAULT_TICK_INTERVAL: i64 = 1;
/// Upper bound (exclusive) for the randomly chosen starting tick.
pub const INITIAL_TICK_RANGE: u64 = 10_000;

// Configuration files
pub const DEFAULT_VARIABLES_PATH: &str = "./test_variables.json";
pub const DEFAULT_SECRETS_PATH: &str = "./test_secrets.json";

// HTTP
pub const DEFAULT_USER_AGENT: &str = concat!("gametest-sandbox/", env!("CARGO_PKG_VERSION"));
pub const REDACTED: &str = "***";
