use std::time::Duration;

use async_trait::async_trait;
use gametest_core::{HttpTransport, ResolvedRequest, ResponseBody, TransportResponse};
use gametest_domain::constants::DEFAULT_USER_AGENT;
use gametest_domain::{GametestError, HttpConfig, HttpMethod, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Method, Response};
use tracing::debug;

use crate::errors::InfraError;

/// [`HttpTransport`] over a reqwest client.
///
/// One call is one exchange: redirects are returned as-is, nothing is
/// retried, and idle connections are not kept for reuse.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::builder().user_agent(config.user_agent.clone()).build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ResolvedRequest) -> Result<TransportResponse> {
        let ResolvedRequest { method, url, headers, body, timeout } = request;

        let mut wire_headers = HeaderMap::with_capacity(headers.len());
        for header in &headers {
            let name = HeaderName::from_bytes(header.key().as_bytes()).map_err(|err| {
                let key = header.key();
                GametestError::InvalidInput(format!("invalid header name '{key}': {err}"))
            })?;
            // The value may be a secret, so it is left out of the message.
            let mut value = HeaderValue::from_str(header.value()).map_err(|_| {
                GametestError::InvalidInput(format!("invalid value for header '{}'", header.key()))
            })?;
            value.set_sensitive(header.is_sensitive());
            wire_headers.append(name, value);
        }

        let mut builder = self.client.request(to_wire_method(method), url).headers(wire_headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(InfraError::from)?;
        let status = response.status().as_u16();
        debug!(status, "received HTTP response head");

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();

        Ok(TransportResponse { status, headers, body: Box::new(ReqwestBody { response }) })
    }
}

/// Streams the payload of a reqwest response chunk by chunk.
struct ReqwestBody {
    response: Response,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self.response.chunk().await.map_err(InfraError::from)?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

fn to_wire_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ReqwestTransportBuilder {
    /// Timeout for requests that do not carry their own.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(self.user_agent);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            GametestError::from(infra)
        })?;

        Ok(ReqwestTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::Arc;

    use gametest_core::{HttpPipeline, SecretStore};
    use gametest_domain::HttpRequest;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn pipeline(transport: ReqwestTransport) -> HttpPipeline {
        HttpPipeline::new(Arc::new(transport), Arc::new(SecretStore::empty()))
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
            .expect(1)
            .mount(&server)
            .await;

        let client = pipeline(ReqwestTransport::new().unwrap());
        let response = client.get(&format!("{}/old", server.uri())).await.unwrap();

        assert_eq!(response.status(), 302);
        assert_eq!(response.header("location"), Some("/new"));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(1)
            .mount(&server)
            .await;

        let client = pipeline(ReqwestTransport::new().unwrap());
        let response = client.get(&server.uri()).await.unwrap();

        assert_eq!(response.status(), 503);
        assert_eq!(response.body(), "busy");
    }

    #[tokio::test]
    async fn sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "sandbox-test/1.0"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::builder().user_agent("sandbox-test/1.0").build().unwrap();
        let response = pipeline(transport).get(&server.uri()).await.unwrap();
        assert_eq!(response.status(), 204);
        assert_eq!(response.body(), "");
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let request = HttpRequest::new(server.uri()).with_timeout(0.05);
        let err = pipeline(ReqwestTransport::new().unwrap()).send(&request).await.unwrap_err();
        assert!(matches!(err, GametestError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = pipeline(ReqwestTransport::new().unwrap())
            .get(&format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, GametestError::Network(_)), "got {err:?}");
    }

    #[test]
    fn methods_map_to_wire_methods() {
        assert_eq!(to_wire_method(HttpMethod::Delete), Method::DELETE);
        assert_eq!(to_wire_method(HttpMethod::Head), Method::HEAD);
        assert_eq!(to_wire_method(HttpMethod::Put), Method::PUT);
    }
}
