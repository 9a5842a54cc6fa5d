//! Per-call orchestration: context build, pipeline, dispatch, decode.

use std::sync::Arc;

use restbind_core::{MethodDescriptor, ReturnShape};
use serde_json::Value;
use tracing::{Instrument, info_span};

use crate::config::ClientConfig;
use crate::context::{ActionContext, ArgValue};
use crate::error::ApiError;
use crate::response::ExchangeResponse;

/// Drives one invocation end to end.
///
/// The sequence is fixed: build the [`ActionContext`], run the
/// pre-send filters, exchange over the transport unless a filter
/// short-circuited, run the post-receive filters, then convert the
/// response per the method's declared return shape. Each step may
/// fail; the error is attributed to that call only.
#[derive(Clone)]
pub struct Interceptor {
    config: Arc<ClientConfig>,
}

impl Interceptor {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// Execute one call and return the decoded response value.
    ///
    /// Unit-shaped methods discard the body without decoding and
    /// yield `Value::Null`; errors from the exchange still surface.
    pub async fn intercept(
        &self,
        descriptor: Arc<MethodDescriptor>,
        args: Vec<ArgValue>,
    ) -> Result<Value, ApiError> {
        let span = info_span!(
            "api_call",
            method = descriptor.name(),
            verb = %descriptor.verb(),
            route = descriptor.route().raw(),
        );
        let timeout = self.config.timeout();

        let call = self.run(descriptor, args);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .instrument(span)
                .await
                .map_err(|_| ApiError::Transport(format!("request timed out after {limit:?}")))?,
            None => call.instrument(span).await,
        }
    }

    async fn run(
        &self,
        descriptor: Arc<MethodDescriptor>,
        args: Vec<ArgValue>,
    ) -> Result<Value, ApiError> {
        let mut ctx = ActionContext::build(
            descriptor,
            args,
            self.config.default_headers(),
            self.config.codec().as_ref(),
        )?;

        if ctx.cancellation().is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        self.config.filters().run_before(&mut ctx).await?;

        if ctx.response().is_none() {
            let response = self.dispatch(&ctx).await?;
            ctx.set_response(response);
        }

        self.config.filters().run_after(&mut ctx).await?;

        let response = ctx
            .take_response()
            .ok_or_else(|| ApiError::Transport("transport produced no response".into()))?;

        if !response.status().is_success() {
            return Err(ApiError::response(response.status(), response.into_body()));
        }

        // The caller never sees a unit-shaped body, so it is not
        // required to be decodable.
        if ctx.descriptor().return_shape() == ReturnShape::Unit {
            return Ok(Value::Null);
        }

        self.config.codec().decode(response.body())
    }

    /// Exchange over the transport, racing the call's cancellation
    /// token so an in-flight request is abandoned promptly.
    async fn dispatch(&self, ctx: &ActionContext) -> Result<ExchangeResponse, ApiError> {
        let request = ctx.request().to_http_request(self.config.base_url())?;
        let cancel = ctx.cancellation().clone();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.config.transport().send(request) => {
                result.map(ExchangeResponse::from_http)
            }
        }
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .finish()
    }
}
