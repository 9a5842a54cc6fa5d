//! Error taxonomy for proxy creation and per-call execution.

use bytes::Bytes;
use http::StatusCode;
use restbind_core::ContractError;

/// Errors produced by the engine.
///
/// Two of these are fatal and surface as early as possible: `Contract`
/// (the declared interface shape is unusable, raised at proxy creation
/// or first resolution) and `Config` (the supplied configuration is
/// unusable, raised at build time). The rest are per-call outcomes:
/// they are attributable to exactly one call and never poison the
/// shared contract caches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The declared contract, method, or parameter shape is unusable.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Missing or invalid caller-supplied configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport collaborator failed (connection, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status, or a
    /// post-receive filter rejected the response.
    #[error("response error: HTTP {status}")]
    Response { status: StatusCode, body: Bytes },

    /// A value could not be serialized for the request.
    #[error("encode error: {0}")]
    Encode(String),

    /// The response body could not be converted to the declared shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The call's cancellation signal fired before completion.
    #[error("call cancelled")]
    Cancelled,
}

impl ApiError {
    /// Build a response error from status and raw body.
    pub fn response(status: StatusCode, body: impl Into<Bytes>) -> Self {
        ApiError::Response {
            status,
            body: body.into(),
        }
    }

    /// The HTTP status, for `Response` errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is fatal to the client as configured, as
    /// opposed to an outcome of one call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Contract(_) | ApiError::Config(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_error_exposes_status() {
        let err = ApiError::response(StatusCode::NOT_FOUND, "missing");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(!err.is_fatal());
    }

    #[test]
    fn contract_and_config_errors_are_fatal() {
        let contract: ApiError = ContractError::UnnamedContract.into();
        assert!(contract.is_fatal());
        assert!(ApiError::Config("no base url".into()).is_fatal());
        assert!(!ApiError::Transport("refused".into()).is_fatal());
    }

    #[test]
    fn cancelled_is_detectable() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::Decode("bad json".into()).is_cancelled());
    }
}
