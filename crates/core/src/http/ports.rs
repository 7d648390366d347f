//! Port interfaces for the HTTP pipeline
//!
//! The pipeline resolves a caller's `HttpRequest` into a [`ResolvedRequest`]
//! and hands it to an [`HttpTransport`]. The resolved request is the only
//! place secret plaintext ever lives outside the store; it is consumed by the
//! transport and its header values are zeroized on drop.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use gametest_domain::constants::REDACTED;
use gametest_domain::{HttpMethod, Result};
use url::Url;
use zeroize::Zeroizing;

/// Header with its final wire value.
pub struct ResolvedHeader {
    key: String,
    value: Zeroizing<String>,
    sensitive: bool,
}

impl ResolvedHeader {
    pub(crate) fn literal(key: String, value: String) -> Self {
        Self { key, value: Zeroizing::new(value), sensitive: false }
    }

    pub(crate) fn secret(key: String, plaintext: &str) -> Self {
        Self { key, value: Zeroizing::new(plaintext.to_string()), sensitive: true }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when the value came from the secret store.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl fmt::Debug for ResolvedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.sensitive { REDACTED } else { self.value.as_str() };
        f.debug_struct("ResolvedHeader").field("key", &self.key).field("value", &value).finish()
    }
}

/// Request as it goes on the wire.
#[derive(Debug)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<ResolvedHeader>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

/// Incremental reader over a response payload.
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the payload, or `None` once the stream has ended.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Raw response handed back by a transport.
pub struct TransportResponse {
    pub status: u16,
    /// Header pairs in the order they were received.
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn ResponseBody>,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Connection-level request execution.
///
/// Implementations must not retry or follow redirects: one call, one
/// exchange. Connection failures, resets, and timeouts are returned as
/// errors; HTTP error statuses are not.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ResolvedRequest) -> Result<TransportResponse>;
}

/// In-memory body made of pre-split chunks.
#[derive(Debug, Default)]
pub struct ChunkedBody {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkedBody {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self { chunks: chunks.into_iter().map(Into::into).collect() }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseBody for ChunkedBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }
}
