//! Per-call state: argument values, the request plan, and the
//! response holder.
//!
//! An [`ActionContext`] is built fresh for every invocation from the
//! resolved [`MethodDescriptor`] and that call's arguments, is owned
//! exclusively by the call, and is dropped when the call completes.
//! Filters receive `&mut ActionContext` at both pipeline stages.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use restbind_core::{BindingKind, MethodDescriptor};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::codec::Codec;
use crate::error::ApiError;
use crate::response::ExchangeResponse;

/// A runtime argument passed to a proxied call.
///
/// Arguments are positional and matched to the method's declared
/// parameters in order. `Text` and scalar `Json` values can bind
/// anywhere; structured `Json` values can only bind to the body.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// A plain string, suitable for path/query/header binding.
    Text(String),
    /// A JSON value, typically for body binding.
    Json(Value),
    /// This call's cancellation token.
    Cancellation(CancellationToken),
}

impl ArgValue {
    pub fn text(value: impl ToString) -> Self {
        ArgValue::Text(value.to_string())
    }

    /// Serialize any serde value into an argument.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(ArgValue::Json)
            .map_err(|e| ApiError::Encode(format!("argument serialization failed: {e}")))
    }

    /// Render as a single text token, if this value is scalar.
    fn as_scalar(&self) -> Option<String> {
        match self {
            ArgValue::Text(s) => Some(s.clone()),
            ArgValue::Json(Value::String(s)) => Some(s.clone()),
            ArgValue::Json(Value::Number(n)) => Some(n.to_string()),
            ArgValue::Json(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Whether this argument carries no value (skipped for query pairs).
    fn is_null(&self) -> bool {
        matches!(self, ArgValue::Json(Value::Null))
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<CancellationToken> for ArgValue {
    fn from(token: CancellationToken) -> Self {
        ArgValue::Cancellation(token)
    }
}

/// The request under construction for one call.
///
/// Pre-send filters may rewrite any part of it; once the pipeline
/// reaches the transport it is frozen into an `http::Request`.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    verb: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestPlan {
    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn set_verb(&mut self, verb: Method) {
        self.verb = verb;
    }

    /// The resolved path, placeholders already substituted.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn push_query(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    /// Freeze the plan into a sendable request against `base_url`
    /// (scheme + authority, no trailing slash).
    pub(crate) fn to_http_request(&self, base_url: &str) -> Result<http::Request<Bytes>, ApiError> {
        let mut uri = String::with_capacity(base_url.len() + self.path.len() + 16);
        uri.push_str(base_url);
        if !self.path.starts_with('/') {
            uri.push('/');
        }
        uri.push_str(&self.path);
        if !self.query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            uri.push('?');
            uri.push_str(&encoded);
        }

        let mut request = http::Request::builder()
            .method(self.verb.clone())
            .uri(&uri)
            .body(self.body.clone().unwrap_or_default())
            .map_err(|e| ApiError::Config(format!("failed to build request for `{uri}`: {e}")))?;
        request.headers_mut().extend(self.headers.clone());
        Ok(request)
    }
}

/// Everything one in-flight invocation owns.
pub struct ActionContext {
    descriptor: Arc<MethodDescriptor>,
    args: Vec<ArgValue>,
    request: RequestPlan,
    response: Option<ExchangeResponse>,
    cancel: CancellationToken,
}

impl ActionContext {
    /// Bind the supplied arguments to the descriptor's parameters by
    /// position and assemble the initial request plan.
    ///
    /// `default_headers` come from the client configuration and are
    /// applied first; method-level headers and header-bound arguments
    /// override them.
    pub(crate) fn build(
        descriptor: Arc<MethodDescriptor>,
        args: Vec<ArgValue>,
        default_headers: &HeaderMap,
        codec: &dyn Codec,
    ) -> Result<Self, ApiError> {
        if args.len() != descriptor.arity() {
            return Err(restbind_core::ContractError::ArityMismatch {
                method: descriptor.name().to_string(),
                expected: descriptor.arity(),
                actual: args.len(),
            }
            .into());
        }

        let mut cancel = None;
        let mut headers = default_headers.clone();
        let mut query = Vec::new();
        let mut body = None;

        for (name, value) in descriptor.headers() {
            insert_header(&mut headers, name, value, descriptor.name())?;
        }

        for param in descriptor.params() {
            let arg = &args[param.position()];
            match param.kind() {
                BindingKind::Path => {
                    // Substituted below, against all path params at once.
                }
                BindingKind::Query => {
                    if arg.is_null() {
                        continue;
                    }
                    let value = arg.as_scalar().ok_or_else(|| {
                        ApiError::Encode(format!(
                            "method `{}`: query parameter `{}` is not a scalar",
                            descriptor.name(),
                            param.name()
                        ))
                    })?;
                    query.push((param.name().to_string(), value));
                }
                BindingKind::Header => {
                    let value = arg.as_scalar().ok_or_else(|| {
                        ApiError::Encode(format!(
                            "method `{}`: header parameter `{}` is not a scalar",
                            descriptor.name(),
                            param.name()
                        ))
                    })?;
                    insert_header(&mut headers, param.name(), &value, descriptor.name())?;
                }
                BindingKind::Body => {
                    let value = match arg {
                        ArgValue::Json(v) => v.clone(),
                        ArgValue::Text(s) => Value::String(s.clone()),
                        ArgValue::Cancellation(_) => {
                            return Err(ApiError::Config(format!(
                                "method `{}`: body parameter `{}` received a cancellation token",
                                descriptor.name(),
                                param.name()
                            )));
                        }
                    };
                    body = Some(codec.encode(&value)?);
                }
                BindingKind::Cancellation => match arg {
                    ArgValue::Cancellation(token) => cancel = Some(token.clone()),
                    _ => {
                        return Err(ApiError::Config(format!(
                            "method `{}`: parameter `{}` expects a cancellation token",
                            descriptor.name(),
                            param.name()
                        )));
                    }
                },
            }
        }

        let path = descriptor
            .route()
            .render(|placeholder| {
                descriptor
                    .params()
                    .iter()
                    .find(|p| p.kind() == BindingKind::Path && p.name() == placeholder)
                    .and_then(|p| args[p.position()].as_scalar())
            })
            .map_err(|placeholder| {
                ApiError::Encode(format!(
                    "method `{}`: path parameter `{placeholder}` is not a scalar",
                    descriptor.name()
                ))
            })?;

        if body.is_some() && !headers.contains_key(http::header::CONTENT_TYPE) {
            insert_header(
                &mut headers,
                http::header::CONTENT_TYPE.as_str(),
                codec.content_type(),
                descriptor.name(),
            )?;
        }

        let request = RequestPlan {
            verb: descriptor.verb().clone(),
            path,
            query,
            headers,
            body,
        };

        Ok(Self {
            descriptor,
            args,
            request,
            response: None,
            cancel: cancel.unwrap_or_default(),
        })
    }

    pub fn descriptor(&self) -> &Arc<MethodDescriptor> {
        &self.descriptor
    }

    /// The raw positional arguments of this call.
    pub fn args(&self) -> &[ArgValue] {
        &self.args
    }

    pub fn request(&self) -> &RequestPlan {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestPlan {
        &mut self.request
    }

    pub fn response(&self) -> Option<&ExchangeResponse> {
        self.response.as_ref()
    }

    pub fn response_mut(&mut self) -> Option<&mut ExchangeResponse> {
        self.response.as_mut()
    }

    /// Install a response. From a pre-send filter this short-circuits
    /// the call: the transport is skipped and the pipeline proceeds
    /// straight to the post-receive stage.
    pub fn set_response(&mut self, response: ExchangeResponse) {
        self.response = Some(response);
    }

    pub(crate) fn take_response(&mut self) -> Option<ExchangeResponse> {
        self.response.take()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("method", &self.descriptor.name())
            .field("args", &self.args.len())
            .field("short_circuited", &self.response.is_some())
            .finish()
    }
}

fn insert_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    method: &str,
) -> Result<(), ApiError> {
    let name: HeaderName = name
        .parse()
        .map_err(|_| ApiError::Config(format!("method `{method}`: invalid header name `{name}`")))?;
    let value: HeaderValue = value.parse().map_err(|_| {
        ApiError::Config(format!("method `{method}`: invalid value for header `{name}`"))
    })?;
    headers.insert(name, value);
    Ok(())
}
