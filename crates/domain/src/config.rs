//! Configuration management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SECRETS_PATH, DEFAULT_TICK_PERIOD_MS, DEFAULT_USER_AGENT, DEFAULT_VARIABLES_PATH,
};
use crate::impl_domain_enum_conversions;

/// Sandbox configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub files: FilesConfig,
    pub scheduler: SchedulerConfig,
    pub http: HttpConfig,
}

/// Locations of the variables and secrets JSON files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub variables_path: PathBuf,
    pub secrets_path: PathBuf,
}

/// Tick scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Wall-clock length of one virtual tick.
    pub tick_period_ms: u64,
    /// Starting tick. A random tick is drawn when unset.
    pub initial_tick: Option<u64>,
}

/// HTTP pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Applied to requests that do not set their own timeout.
    pub default_timeout_seconds: Option<f64>,
    pub unresolved_secret_policy: UnresolvedSecretPolicy,
    pub user_agent: String,
}

/// What the pipeline does with a secret header whose handle has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedSecretPolicy {
    /// Fail the send before anything goes on the wire.
    #[default]
    Reject,
    /// Drop the header and send the rest of the request.
    Omit,
}

impl_domain_enum_conversions!(UnresolvedSecretPolicy {
    Reject => "reject",
    Omit => "omit",
});

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            variables_path: PathBuf::from(DEFAULT_VARIABLES_PATH),
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_period_ms: DEFAULT_TICK_PERIOD_MS, initial_tick: None }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: None,
            unresolved_secret_policy: UnresolvedSecretPolicy::Reject,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SandboxConfig::default();
        assert_eq!(config.scheduler.tick_period_ms, 20);
        assert_eq!(config.scheduler.initial_tick, None);
        assert_eq!(config.files.secrets_path, PathBuf::from("./test_secrets.json"));
        assert_eq!(config.http.unresolved_secret_policy, UnresolvedSecretPolicy::Reject);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SandboxConfig =
            serde_json::from_str(r#"{"scheduler":{"initial_tick":100}}"#).unwrap();
        assert_eq!(config.scheduler.initial_tick, Some(100));
        assert_eq!(config.scheduler.tick_period_ms, 20);
        assert_eq!(config.files, FilesConfig::default());
    }

    #[test]
    fn policy_parses_from_toml() {
        let config: SandboxConfig =
            toml::from_str("[http]\nunresolved_secret_policy = \"omit\"\n").unwrap();
        assert_eq!(config.http.unresolved_secret_policy, UnresolvedSecretPolicy::Omit);
        assert_eq!("REJECT".parse::<UnresolvedSecretPolicy>().unwrap(), UnresolvedSecretPolicy::Reject);
    }
}
