//! Example: a script that polls a status endpoint on a timer
//!
//! Loads configuration the usual way (`GAMETEST_*` variables, then
//! `gametest.{json,toml}` / `config.{json,toml}`, then defaults), so the
//! variables and secrets files must exist:
//!
//! ```bash
//! echo '{"status_url": "https://httpbin.org/anything"}' > test_variables.json
//! echo '{"api_key": "sk_test_123"}' > test_secrets.json
//! GAMETEST_LOG=gametest=debug cargo run -p gametest-infra --example base_client
//! ```

use std::time::Duration;

use gametest_domain::{HttpMethod, HttpRequest};
use gametest_infra::observability::{init_tracing, LogFormat};
use gametest_infra::{config, Sandbox};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env())?;

    let mut sandbox = Sandbox::from_config(&config::load()?)?;
    let status_url = sandbox
        .variables()
        .get_str("status_url")
        .unwrap_or("https://httpbin.org/anything")
        .to_string();
    let api_key = sandbox.secrets().get("api_key");

    // Poll every 50 ticks; each poll runs on the runtime, not the tick loop.
    let http = sandbox.http().clone();
    let runtime = tokio::runtime::Handle::current();
    sandbox.scheduler().schedule_repeating(
        move || {
            let mut request = HttpRequest::new(status_url.clone())
                .with_method(HttpMethod::Post)
                .with_header("Content-Type", "application/json")
                .with_body(r#"{"score":22}"#);
            if let Some(handle) = api_key {
                request.add_header("Authorization", handle);
            }

            let http = http.clone();
            runtime.spawn(async move {
                match http.send(&request).await {
                    Ok(response) => info!(status = response.status(), "status poll"),
                    Err(err) => warn!(error = %err, "status poll failed"),
                }
            });
            Ok(())
        },
        50,
    )?;

    sandbox.start()?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    sandbox.shutdown().await?;
    Ok(())
}
