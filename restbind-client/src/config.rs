//! Client configuration and its builder.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::codec::{Codec, JsonCodec};
use crate::error::ApiError;
use crate::pipeline::{Filter, FilterChain};
use crate::transport::{HyperTransport, Transport};

/// Validated, immutable configuration shared by every call a client
/// makes. Built once through [`ClientConfigBuilder`]; invalid input is
/// rejected at build time so calls never fail on configuration.
pub struct ClientConfig {
    base_url: String,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn Codec>,
    filters: FilterChain,
}

impl ClientConfig {
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }

    /// Scheme and authority, no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("filters", &self.filters.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    base_url: String,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
    codec: Option<Arc<dyn Codec>>,
    filters: FilterChain,
}

impl ClientConfigBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
            timeout: None,
            transport: None,
            codec: None,
            filters: FilterChain::new(),
        }
    }

    /// Add a header sent with every request. Method-level headers and
    /// header-bound arguments override it.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overall deadline for each call, covering both pipeline stages
    /// and the transport exchange. No timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the transport. Defaults to [`HyperTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn transport_arc(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the body codec. Defaults to [`JsonCodec`].
    pub fn codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Append a filter. Filters run in the order they are added.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn filter_arc(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn build(self) -> Result<ClientConfig, ApiError> {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::Config("base URL is empty".into()));
        }
        let parsed = url::Url::parse(trimmed)
            .map_err(|e| ApiError::Config(format!("invalid base URL `{trimmed}`: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base URL `{trimmed}` must use http or https"
            )));
        }

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name: HeaderName = name
                .parse()
                .map_err(|_| ApiError::Config(format!("invalid default header name `{name}`")))?;
            let value: HeaderValue = value.parse().map_err(|_| {
                ApiError::Config(format!("invalid value for default header `{name}`"))
            })?;
            default_headers.insert(name, value);
        }

        Ok(ClientConfig {
            base_url: trimmed.to_string(),
            default_headers,
            timeout: self.timeout,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
            codec: self.codec.unwrap_or_else(|| Arc::new(JsonCodec)),
            filters: self.filters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let config = ClientConfig::builder("http://localhost:3000/").build().unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn rejects_garbage_base_url() {
        let err = ClientConfig::builder("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder("ftp://host").build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn rejects_invalid_default_header() {
        let err = ClientConfig::builder("http://localhost")
            .default_header("bad header", "v")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn collects_default_headers_and_timeout() {
        let config = ClientConfig::builder("http://localhost")
            .default_header("x-api-key", "secret")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.default_headers().get("x-api-key").unwrap(), "secret");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }
}
