//! HTTP pipeline with secret resolution
//!
//! Turns a script's [`HttpRequest`] into a wire request, sends it through the
//! configured [`HttpTransport`], and buffers the reply into an
//! [`HttpResponse`]. Each call is independent: no retries, no shared mutable
//! state beyond the read-only secret store.

use std::sync::Arc;
use std::time::Duration;

use gametest_domain::{
    GametestError, HeaderValue, HttpHeader, HttpRequest, HttpResponse, Result,
    UnresolvedSecretPolicy,
};
use tracing::{debug, instrument, warn};
use url::Url;

use super::ports::{HttpTransport, ResolvedHeader, ResolvedRequest, TransportResponse};
use crate::secrets::SecretStore;

/// Pipeline behaviour that is not part of an individual request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineConfig {
    pub unresolved_secret_policy: UnresolvedSecretPolicy,
    /// Timeout for requests that do not set `timeout_seconds`.
    pub default_timeout_seconds: Option<f64>,
}

/// Script-facing HTTP client.
#[derive(Clone)]
pub struct HttpPipeline {
    transport: Arc<dyn HttpTransport>,
    secrets: Arc<SecretStore>,
    config: PipelineConfig,
}

impl HttpPipeline {
    pub fn new(transport: Arc<dyn HttpTransport>, secrets: Arc<SecretStore>) -> Self {
        Self::with_config(transport, secrets, PipelineConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn HttpTransport>,
        secrets: Arc<SecretStore>,
        config: PipelineConfig,
    ) -> Self {
        Self { transport, secrets, config }
    }

    pub fn secrets(&self) -> &Arc<SecretStore> {
        &self.secrets
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// GET `uri` with no headers and no body.
    ///
    /// # Errors
    /// Same as [`HttpPipeline::send`].
    #[instrument(skip(self))]
    pub async fn get(&self, uri: &str) -> Result<HttpResponse> {
        self.send(&HttpRequest::new(uri)).await
    }

    /// Send `request` and buffer the full response.
    ///
    /// The caller's request is only borrowed; secret handles in it stay
    /// handles. The returned response carries a clone of it.
    ///
    /// # Errors
    /// - `InvalidInput` for an unparsable URI or a negative/non-finite timeout
    /// - `UnresolvedSecret` when a secret header cannot be resolved under the
    ///   `Reject` policy (nothing is sent)
    /// - `Network` / `Timeout` when the transport fails
    #[instrument(skip(self, request), fields(method = %request.method, uri = %request.uri))]
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let resolved = self.resolve(request)?;
        debug!(
            headers = ?resolved.headers.iter().map(ResolvedHeader::key).collect::<Vec<_>>(),
            has_body = resolved.body.is_some(),
            timeout_ms = resolved.timeout.map(|t| t.as_millis() as u64),
            "dispatching request"
        );

        let response = self.transport.execute(resolved).await?;
        let response = assemble(request, response).await?;

        debug!(status = response.status(), body_len = response.body().len(), "response assembled");
        Ok(response)
    }

    fn resolve(&self, request: &HttpRequest) -> Result<ResolvedRequest> {
        let url = Url::parse(&request.uri).map_err(|err| {
            GametestError::InvalidInput(format!("invalid URI '{}': {err}", request.uri))
        })?;

        let mut headers = Vec::with_capacity(request.headers.len());
        for header in &request.headers {
            if let Some(resolved) = self.resolve_header(header)? {
                headers.push(resolved);
            }
        }

        let timeout = match request.timeout_seconds.or(self.config.default_timeout_seconds) {
            Some(seconds) => timeout_from_seconds(seconds)?,
            None => None,
        };

        Ok(ResolvedRequest {
            method: request.method,
            url,
            headers,
            body: request.body.clone(),
            timeout,
        })
    }

    fn resolve_header(&self, header: &HttpHeader) -> Result<Option<ResolvedHeader>> {
        let handle = match &header.value {
            HeaderValue::Text(value) => {
                return Ok(Some(ResolvedHeader::literal(header.key.clone(), value.clone())));
            }
            HeaderValue::Secret(handle) => *handle,
        };

        if let Some(plaintext) = self.secrets.reveal(handle) {
            return Ok(Some(ResolvedHeader::secret(header.key.clone(), plaintext)));
        }

        match self.config.unresolved_secret_policy {
            UnresolvedSecretPolicy::Reject => Err(GametestError::UnresolvedSecret(format!(
                "header '{}' references {handle}, which this store did not issue",
                header.key
            ))),
            UnresolvedSecretPolicy::Omit => {
                warn!(header = %header.key, %handle, "dropping header with unresolved secret");
                Ok(None)
            }
        }
    }
}

/// Collect headers in arrival order and drain the body to end-of-stream.
async fn assemble(request: &HttpRequest, response: TransportResponse) -> Result<HttpResponse> {
    let TransportResponse { status, headers, mut body } = response;
    let headers = headers.into_iter().map(|(key, value)| HttpHeader::new(key, value)).collect();

    let mut payload = Vec::new();
    while let Some(chunk) = body.next_chunk().await? {
        payload.extend_from_slice(&chunk);
    }

    // Decode once, after the last chunk, so multi-byte characters split
    // across chunk boundaries survive.
    let body = match String::from_utf8(payload) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    };

    Ok(HttpResponse::new(request.clone(), headers, body, status))
}

/// Seconds to a transport timeout. Zero disables the timeout.
///
/// # Errors
/// Returns `InvalidInput` for negative or non-finite values.
pub fn timeout_from_seconds(seconds: f64) -> Result<Option<Duration>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(GametestError::InvalidInput(format!(
            "timeout must be a non-negative number of seconds, got {seconds}"
        )));
    }
    if seconds == 0.0 {
        return Ok(None);
    }

    let millis = (seconds * 1000.0).round().max(1.0);
    Ok(Some(Duration::from_millis(millis as u64)))
}
