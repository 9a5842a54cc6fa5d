//! HTTP dispatch seam and the default hyper-based transport.
//!
//! The engine only ever talks to [`Transport`]: one fully built request
//! in, one buffered response out. [`HyperTransport`] is the production
//! implementation on hyper_util's legacy client (HTTP/1.1 and HTTP/2
//! with connection pooling); tests substitute recording doubles.

use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};

use crate::error::ApiError;

/// The wire collaborator: sends one request, yields one response.
///
/// Implementations must be cheap to share (`Arc<dyn Transport>` is
/// cloned into every interceptor) and must report failures as
/// [`ApiError::Transport`]. Cancellation is handled by the caller
/// racing the returned future against the call's token.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<Bytes>, ApiError>>;
}

type HyperClient = Client<HttpConnector, Full<Bytes>>;

/// Default transport using hyper_util's legacy client.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
}

impl HyperTransport {
    /// Create a transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a transport with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl Transport for HyperTransport {
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<Bytes>, ApiError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let request = http::Request::from_parts(parts, Full::new(body));

            let response = client
                .request(request)
                .await
                .map_err(|e| ApiError::Transport(format!("request failed: {e}")))?;

            let (parts, body) = response.into_parts();
            let bytes = body
                .collect()
                .await
                .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))?
                .to_bytes();

            Ok(http::Response::from_parts(parts, bytes))
        })
    }
}

/// Builder for [`HyperTransport`].
#[derive(Debug)]
pub struct HyperTransportBuilder {
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
    /// Force HTTP/2 only (h2c prior knowledge).
    http2_only: bool,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    pub fn new() -> Self {
        Self {
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            http2_only: false,
        }
    }

    /// Set the connection pool idle timeout. Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of idle connections per host. Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Use HTTP/2 without the HTTP/1.1 upgrade handshake.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    pub fn build(self) -> HyperTransport {
        let mut builder = Client::builder(TokioExecutor::new());
        builder.pool_timer(TokioTimer::new());
        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);
        if self.http2_only {
            builder.http2_only(true);
        }

        HyperTransport {
            client: builder.build_http(),
        }
    }
}
