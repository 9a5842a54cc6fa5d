//! Deferred call handles.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::ApiError;

/// A call already in flight on the runtime.
///
/// Returned by deferred-shaped methods: the request is dispatched
/// immediately and this handle yields the typed result when awaited.
/// Transport and decode failures surface here, not at the call site.
/// Dropping the handle detaches the call; it keeps running.
#[derive(Debug)]
pub struct CallHandle<T> {
    inner: JoinHandle<Result<T, ApiError>>,
}

impl<T> CallHandle<T> {
    pub(crate) fn new(inner: JoinHandle<Result<T, ApiError>>) -> Self {
        Self { inner }
    }

    /// Abort the in-flight call. Awaiting afterwards yields
    /// [`ApiError::Cancelled`].
    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Future for CallHandle<T> {
    type Output = Result<T, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => {
                if join_err.is_cancelled() {
                    Poll::Ready(Err(ApiError::Cancelled))
                } else {
                    // The call task panicked; propagate on the awaiting task.
                    std::panic::resume_unwind(join_err.into_panic())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_to_the_task_result() {
        let handle: CallHandle<u32> = CallHandle::new(tokio::spawn(async { Ok(7) }));
        assert_eq!(handle.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn abort_yields_cancelled() {
        let handle: CallHandle<u32> = CallHandle::new(tokio::spawn(async {
            futures::future::pending::<()>().await;
            unreachable!()
        }));
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
