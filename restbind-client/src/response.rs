//! Buffered response representation.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// One finished HTTP exchange as seen by the pipeline.
///
/// Produced by the transport (or by a short-circuiting pre-send
/// filter) and inspectable/replaceable by post-receive filters before
/// the return-shape conversion runs.
#[derive(Debug, Clone)]
pub struct ExchangeResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ExchangeResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A 200 response with the given body and no headers. Convenient
    /// for filters that serve a locally produced result.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }

    pub(crate) fn from_http(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// A response header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}
