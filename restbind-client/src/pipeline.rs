//! Request pipeline: ordered filters around the transport exchange.
//!
//! Filters run in registration order at BOTH stages. A pre-send filter
//! that installs a response short-circuits the remaining pre-send
//! filters and the transport; post-receive filters still run.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

use crate::context::ActionContext;
use crate::error::ApiError;
use crate::response::ExchangeResponse;

/// A pipeline stage observing or rewriting one call.
///
/// Both hooks default to no-ops so a filter implements only the stage
/// it cares about. Filters are shared across concurrent calls and keep
/// per-call state in the [`ActionContext`], never in themselves.
pub trait Filter: Send + Sync {
    /// Runs after the request plan is built, before dispatch.
    ///
    /// May rewrite the plan, or call [`ActionContext::set_response`]
    /// to serve the call locally and skip the transport.
    fn before_send<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        let _ = ctx;
        Box::pin(async { Ok(()) })
    }

    /// Runs after a response is available (from the transport or from
    /// a short-circuiting filter), before shape conversion.
    fn after_receive<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        let _ = ctx;
        Box::pin(async { Ok(()) })
    }
}

/// The ordered filter list for one client.
///
/// Cloning is cheap; filters themselves are behind `Arc`.
#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Arc<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the pre-send stage in registration order.
    ///
    /// Stops early when a filter installs a response or the call's
    /// cancellation token fires between filters.
    pub(crate) async fn run_before(&self, ctx: &mut ActionContext) -> Result<(), ApiError> {
        for filter in &self.filters {
            if ctx.cancellation().is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            filter.before_send(ctx).await?;
            if ctx.response().is_some() {
                debug!(method = ctx.descriptor().name(), "pre-send filter short-circuited the call");
                break;
            }
        }
        Ok(())
    }

    /// Run the post-receive stage, same order as pre-send.
    pub(crate) async fn run_after(&self, ctx: &mut ActionContext) -> Result<(), ApiError> {
        for filter in &self.filters {
            if ctx.cancellation().is_cancelled() {
                return Err(ApiError::Cancelled);
            }
            filter.after_receive(ctx).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

/// Adds a fixed header to every outgoing request.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    name: http::HeaderName,
    value: http::HeaderValue,
}

impl HeaderFilter {
    pub fn new(name: http::HeaderName, value: http::HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Filter for HeaderFilter {
    fn before_send<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            ctx.request_mut()
                .headers_mut()
                .insert(self.name.clone(), self.value.clone());
            Ok(())
        })
    }
}

/// Logs each exchange at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceFilter;

impl Filter for TraceFilter {
    fn before_send<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            debug!(
                method = ctx.descriptor().name(),
                verb = %ctx.request().verb(),
                path = ctx.request().path(),
                "dispatching request"
            );
            Ok(())
        })
    }

    fn after_receive<'a>(
        &'a self,
        ctx: &'a mut ActionContext,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(async move {
            if let Some(response) = ctx.response() {
                debug!(
                    method = ctx.descriptor().name(),
                    status = %response.status(),
                    bytes = response.body().len(),
                    "received response"
                );
            }
            Ok(())
        })
    }
}
