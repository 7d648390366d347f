//! Owner of everything a script can reach.
//!
//! # Example
//!
//! ```no_run
//! use gametest_infra::{config, Sandbox};
//!
//! # async fn example() -> gametest_domain::Result<()> {
//! let mut sandbox = Sandbox::from_config(&config::load()?)?;
//! sandbox.start()?;
//!
//! let response = sandbox.http().get("https://example.com/status").await?;
//! println!("{}", response.status());
//!
//! sandbox.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use gametest_core::{
    HttpPipeline, HttpTransport, PipelineConfig, SecretStore, ServerVariables, TickScheduler,
};
use gametest_domain::{Result, SandboxConfig};
use tracing::{info, instrument};

use crate::config::{load_secrets, load_variables};
use crate::http::ReqwestTransport;
use crate::scheduling::TickDriver;

/// Secrets, variables, HTTP pipeline, and tick scheduler for one sandbox.
///
/// Nothing here is global: two sandboxes in one process share no state.
pub struct Sandbox {
    config: SandboxConfig,
    http: HttpPipeline,
    driver: TickDriver,
    secrets: Arc<SecretStore>,
    variables: Arc<ServerVariables>,
}

impl Sandbox {
    /// Load the input files and build a sandbox on the reqwest transport.
    ///
    /// # Errors
    /// Returns `GametestError::Config` if either input file is missing or
    /// malformed, and `GametestError::Scheduler` for a zero tick period.
    #[instrument(skip(config), fields(
        secrets = %config.files.secrets_path.display(),
        variables = %config.files.variables_path.display()
    ))]
    pub fn from_config(config: &SandboxConfig) -> Result<Self> {
        let secrets = load_secrets(&config.files.secrets_path)?;
        let variables = load_variables(&config.files.variables_path)?;
        let transport = ReqwestTransport::from_config(&config.http)?;
        Self::with_parts(config.clone(), Arc::new(transport), secrets, variables)
    }

    /// Build a sandbox from already-loaded inputs and any transport.
    ///
    /// # Errors
    /// Returns `GametestError::Scheduler` if the tick period is zero.
    pub fn with_parts(
        config: SandboxConfig,
        transport: Arc<dyn HttpTransport>,
        secrets: SecretStore,
        variables: ServerVariables,
    ) -> Result<Self> {
        let secrets = Arc::new(secrets);
        let http = HttpPipeline::with_config(
            transport,
            Arc::clone(&secrets),
            PipelineConfig {
                unresolved_secret_policy: config.http.unresolved_secret_policy,
                default_timeout_seconds: config.http.default_timeout_seconds,
            },
        );
        let scheduler = TickScheduler::from_config(&config.scheduler);
        let driver = TickDriver::from_config(scheduler, &config.scheduler)?;

        info!(
            secrets = secrets.len(),
            variables = variables.len(),
            initial_tick = driver.scheduler().current_tick(),
            "Sandbox ready"
        );

        Ok(Self { config, http, driver, secrets, variables: Arc::new(variables) })
    }

    /// Start advancing ticks in wall-clock time.
    ///
    /// # Errors
    /// Returns `GametestError::Scheduler` if already started or called
    /// outside a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        self.driver.start()?;
        Ok(())
    }

    /// Stop the tick driver if it is running.
    ///
    /// # Errors
    /// Returns `GametestError::Scheduler` if the tick loop fails to join.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.driver.is_running() {
            self.driver.stop().await?;
        }
        info!(tick = self.driver.scheduler().current_tick(), "Sandbox shut down");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn http(&self) -> &HttpPipeline {
        &self.http
    }

    pub fn scheduler(&self) -> &TickScheduler {
        self.driver.scheduler()
    }

    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    pub fn variables(&self) -> &ServerVariables {
        &self.variables
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }
}
