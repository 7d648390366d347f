//! Shared fixtures for `gametest-infra` integration tests.

use std::path::{Path, PathBuf};

use gametest_domain::{FilesConfig, SandboxConfig, SchedulerConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const API_KEY: &str = "sk_test_4eC39HqLyjWDarjtT1zdp7dc";

/// Variables and secrets files written to a temporary directory that lives
/// as long as the fixture.
pub struct SandboxFiles {
    pub variables_path: PathBuf,
    pub secrets_path: PathBuf,
    dir: TempDir,
}

impl SandboxFiles {
    pub fn new() -> Self {
        Self::with_contents(
            &json!({ "server_name": "test-realm", "max_players": 20 }),
            &json!({ "api_key": API_KEY, "webhook_token": "whk_9f8e7d" }),
        )
    }

    pub fn with_contents(variables: &Value, secrets: &Value) -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let variables_path = dir.path().join("test_variables.json");
        let secrets_path = dir.path().join("test_secrets.json");
        write_json(&variables_path, variables);
        write_json(&secrets_path, secrets);
        Self { variables_path, secrets_path, dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Config pointing at these files, with a fixed start tick and a fast
    /// tick period.
    pub fn config(&self) -> SandboxConfig {
        SandboxConfig {
            files: FilesConfig {
                variables_path: self.variables_path.clone(),
                secrets_path: self.secrets_path.clone(),
            },
            scheduler: SchedulerConfig { tick_period_ms: 5, initial_tick: Some(100) },
            ..SandboxConfig::default()
        }
    }
}

impl Default for SandboxFiles {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_json(path: &Path, value: &Value) {
    let contents = serde_json::to_string_pretty(value).expect("fixture should serialize");
    std::fs::write(path, contents).expect("fixture should be written");
}
