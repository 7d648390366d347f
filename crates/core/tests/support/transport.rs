//! Recording transport for pipeline tests

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gametest_core::{ChunkedBody, HttpTransport, ResolvedRequest, TransportResponse};
use gametest_domain::{GametestError, HttpMethod, Result as DomainResult};
use parking_lot::Mutex;

/// Owned copy of what the pipeline handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub method: HttpMethod,
    pub url: String,
    /// `(key, value, sensitive)` in wire order.
    pub headers: Vec<(String, String, bool)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl CapturedRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _, _)| k == key).map(|(_, value, _)| value.as_str())
    }
}

/// Canned reply for one `execute` call.
#[derive(Debug, Clone)]
pub enum CannedReply {
    Response { status: u16, headers: Vec<(String, String)>, chunks: Vec<Vec<u8>> },
    Error(GametestError),
}

impl CannedReply {
    pub fn ok(body: &str) -> Self {
        Self::Response { status: 200, headers: Vec::new(), chunks: vec![body.as_bytes().to_vec()] }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Response { status, headers: Vec::new(), chunks: vec![body.as_bytes().to_vec()] }
    }

    pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self::Response { status: 200, headers: Vec::new(), chunks }
    }
}

/// Transport that records every request and replays canned replies.
///
/// Once the queue is empty every call answers `200` with an empty body.
#[derive(Default, Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    replies: Arc<Mutex<VecDeque<CannedReply>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: CannedReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: ResolvedRequest) -> DomainResult<TransportResponse> {
        self.requests.lock().push(CapturedRequest {
            method: request.method,
            url: request.url.to_string(),
            headers: request
                .headers
                .iter()
                .map(|h| (h.key().to_string(), h.value().to_string(), h.is_sensitive()))
                .collect(),
            body: request.body.clone(),
            timeout: request.timeout,
        });

        let reply = self.replies.lock().pop_front();
        match reply {
            Some(CannedReply::Response { status, headers, chunks }) => {
                Ok(TransportResponse { status, headers, body: Box::new(ChunkedBody::new(chunks)) })
            }
            Some(CannedReply::Error(err)) => Err(err),
            None => Ok(TransportResponse {
                status: 200,
                headers: Vec::new(),
                body: Box::new(ChunkedBody::empty()),
            }),
        }
    }
}
