//! HTTP request and response descriptors
//!
//! These are the values a script builds and receives. A request can carry
//! [`SecretHandle`]s as header values; only the pipeline ever turns them into
//! plaintext, and it does so on a private copy.

use serde::{Deserialize, Serialize};

use super::secret::SecretHandle;
use crate::constants::REDACTED;
use crate::impl_domain_enum_conversions;

/// HTTP methods a script may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    #[default]
    Get,
    /// Like GET, but only the response headers are of interest.
    Head,
    Post,
    Put,
}

impl_domain_enum_conversions!(HttpMethod {
    Delete => "DELETE",
    Get => "GET",
    Head => "HEAD",
    Post => "POST",
    Put => "PUT",
});

/// Value of a header: literal text or a reference to a configured secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    Secret(SecretHandle),
}

impl HeaderValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Secret(_) => None,
        }
    }

    pub fn as_secret(&self) -> Option<SecretHandle> {
        match self {
            Self::Text(_) => None,
            Self::Secret(handle) => Some(*handle),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret(_))
    }

    /// Text safe to show in logs: literal values verbatim, secrets masked.
    pub fn display_value(&self) -> &str {
        match self {
            Self::Text(value) => value,
            Self::Secret(_) => REDACTED,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<SecretHandle> for HeaderValue {
    fn from(value: SecretHandle) -> Self {
        Self::Secret(value)
    }
}

/// A single header pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub key: String,
    pub value: HeaderValue,
}

impl HttpHeader {
    pub fn new(key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Outgoing request description.
///
/// Fields are public so scripts can build requests either field by field or
/// through the `with_*` builders. The pipeline only ever borrows a request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub uri: String,
    pub headers: Vec<HttpHeader>,
    pub method: HttpMethod,
    pub body: Option<String>,
    /// Transport timeout in seconds. `None` or `0` disables it.
    pub timeout_seconds: Option<f64>,
}

impl HttpRequest {
    /// GET request with no headers, body, or timeout.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: Vec::new(),
            method: HttpMethod::Get,
            body: None,
            timeout_seconds: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.add_header(key, value);
        self
    }

    /// Replace the whole header list.
    pub fn with_headers(mut self, headers: Vec<HttpHeader>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Append a header, keeping earlier ones (duplicates allowed).
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<HeaderValue>) {
        self.headers.push(HttpHeader::new(key, value));
    }

    pub fn has_secret_headers(&self) -> bool {
        self.headers.iter().any(|header| header.value.is_secret())
    }
}

/// Fully buffered response. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    request: HttpRequest,
    headers: Vec<HttpHeader>,
    body: String,
    status: u16,
}

impl HttpResponse {
    pub fn new(request: HttpRequest, headers: Vec<HttpHeader>, body: String, status: u16) -> Self {
        Self { request, headers, body, status }
    }

    /// The request exactly as the caller supplied it (secret handles intact).
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Response headers in the order they were received.
    pub fn headers(&self) -> &[HttpHeader] {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.key.eq_ignore_ascii_case(name))
            .and_then(|header| header.value.as_text())
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
