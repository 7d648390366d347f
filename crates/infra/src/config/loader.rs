//! Configuration loader
//!
//! Loads sandbox configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Any `GAMETEST_*` variable that is set overrides the defaults
//! 2. If none is set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Without a config file, the defaults are used as-is
//!
//! ## Environment Variables
//! - `GAMETEST_VARIABLES_PATH`: Path of the server variables JSON file
//! - `GAMETEST_SECRETS_PATH`: Path of the secrets JSON file
//! - `GAMETEST_TICK_PERIOD_MS`: Wall-clock length of one tick
//! - `GAMETEST_INITIAL_TICK`: Starting tick (random when unset)
//! - `GAMETEST_DEFAULT_TIMEOUT_SECONDS`: Default HTTP timeout
//! - `GAMETEST_UNRESOLVED_SECRET_POLICY`: `reject` or `omit`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./gametest.json` or `./gametest.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gametest_core::{SecretStore, ServerVariables};
use gametest_domain::{GametestError, Result, SandboxConfig, UnresolvedSecretPolicy};

use crate::errors::InfraError;

const ENV_VARIABLES_PATH: &str = "GAMETEST_VARIABLES_PATH";
const ENV_SECRETS_PATH: &str = "GAMETEST_SECRETS_PATH";
const ENV_TICK_PERIOD_MS: &str = "GAMETEST_TICK_PERIOD_MS";
const ENV_INITIAL_TICK: &str = "GAMETEST_INITIAL_TICK";
const ENV_DEFAULT_TIMEOUT_SECONDS: &str = "GAMETEST_DEFAULT_TIMEOUT_SECONDS";
const ENV_UNRESOLVED_SECRET_POLICY: &str = "GAMETEST_UNRESOLVED_SECRET_POLICY";

const CONFIG_FILE_NAMES: [&str; 4] = ["gametest.json", "gametest.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Environment overrides win when at least one `GAMETEST_*` variable is set.
/// Otherwise a probed config file is used, and without one the defaults.
///
/// # Errors
/// Returns `GametestError::Config` if a set variable has an invalid value or
/// the probed file cannot be read or parsed.
pub fn load() -> Result<SandboxConfig> {
    if let Some(config) = env_overrides()? {
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No config file found, using default configuration");
            Ok(SandboxConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// Unset variables keep their defaults.
///
/// # Errors
/// Returns `GametestError::Config` if no `GAMETEST_*` variable is set or a
/// set variable has an invalid value.
pub fn load_from_env() -> Result<SandboxConfig> {
    env_overrides()?.ok_or_else(|| {
        GametestError::Config("no GAMETEST_* configuration variables are set".to_string())
    })
}

fn env_overrides() -> Result<Option<SandboxConfig>> {
    let mut config = SandboxConfig::default();
    let mut found = false;

    if let Some(path) = env_opt(ENV_VARIABLES_PATH) {
        config.files.variables_path = PathBuf::from(path);
        found = true;
    }
    if let Some(path) = env_opt(ENV_SECRETS_PATH) {
        config.files.secrets_path = PathBuf::from(path);
        found = true;
    }
    if let Some(period) = env_parse::<u64>(ENV_TICK_PERIOD_MS)? {
        config.scheduler.tick_period_ms = period;
        found = true;
    }
    if let Some(tick) = env_parse::<u64>(ENV_INITIAL_TICK)? {
        config.scheduler.initial_tick = Some(tick);
        found = true;
    }
    if let Some(seconds) = env_parse::<f64>(ENV_DEFAULT_TIMEOUT_SECONDS)? {
        config.http.default_timeout_seconds = Some(seconds);
        found = true;
    }
    if let Some(policy) = env_opt(ENV_UNRESOLVED_SECRET_POLICY) {
        config.http.unresolved_secret_policy =
            policy.parse::<UnresolvedSecretPolicy>().map_err(GametestError::Config)?;
        found = true;
    }

    Ok(found.then_some(config))
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GametestError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<SandboxConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GametestError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GametestError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = read_input(&config_path, "config")?;
    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<SandboxConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let parsed = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from),
        "json" => serde_json::from_str(contents).map_err(InfraError::from),
        _ => {
            return Err(GametestError::Config(format!("Unsupported config format: {extension}")))
        }
    };
    parsed.map_err(|err| err.with_context(path.display()).into())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Read the server variables file: a JSON object of named values.
///
/// # Errors
/// Returns `GametestError::Config` if the file is missing, is not valid JSON,
/// or its root is not an object.
pub fn load_variables(path: &Path) -> Result<ServerVariables> {
    let contents = read_input(path, "variables")?;
    let json = parse_json(&contents, path, "variables")?;
    let variables = ServerVariables::from_json(json)?;
    tracing::debug!(path = %path.display(), count = variables.len(), "Loaded server variables");
    Ok(variables)
}

/// Read the secrets file: a JSON object of named string values.
///
/// # Errors
/// Returns `GametestError::Config` if the file is missing, is not valid JSON,
/// or is not an object of strings. Messages never include secret values.
pub fn load_secrets(path: &Path) -> Result<SecretStore> {
    let contents = read_input(path, "secrets")?;
    let json = parse_json(&contents, path, "secrets")?;
    let secrets = SecretStore::from_json(json)?;
    tracing::debug!(path = %path.display(), count = secrets.len(), "Loaded secrets");
    Ok(secrets)
}

fn read_input(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| {
        InfraError::from(err).with_context(format_args!("{what} file {}", path.display())).into()
    })
}

fn parse_json(contents: &str, path: &Path, what: &str) -> Result<serde_json::Value> {
    serde_json::from_str(contents).map_err(|err| {
        InfraError::from(err).with_context(format_args!("{what} file {}", path.display())).into()
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `GametestError::Config` if the variable is set but invalid.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| GametestError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}
