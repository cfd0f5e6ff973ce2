//! Dispatch tracing middleware.
//!
//! Wraps each dispatch in a `tracing` span carrying the event family, type and
//! routing key, then records duration and outcome once the handler returns.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use depot_core::TypedEvent;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::error::DispatchError;

// ---------------------------------------------------------------------------
// DispatchTraceLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments event dispatch with `tracing` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchTraceLayer;

impl<S> Layer<S> for DispatchTraceLayer {
    type Service = DispatchTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DispatchTraceService { inner }
    }
}

// ---------------------------------------------------------------------------
// DispatchTraceService
// ---------------------------------------------------------------------------

/// Service wrapper that records dispatch duration and outcome.
#[derive(Debug, Clone)]
pub struct DispatchTraceService<S> {
    inner: S,
}

impl<S> DispatchTraceService<S> {
    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, E> Service<E> for DispatchTraceService<S>
where
    E: TypedEvent,
    S: Service<E, Response = (), Error = DispatchError> + Send,
    S::Future: Send + 'static,
{
    type Response = ();
    type Error = DispatchError;
    type Future = Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, event: E) -> Self::Future {
        let event_type = event.kind().to_string();
        let span = info_span!(
            "dispatch",
            family = E::FAMILY,
            event_type = %event_type,
            hub_id = %event.routing_key(),
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(event);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                let outcome = match &result {
                    Ok(()) => "ok",
                    Err(DispatchError::Unrecognized { .. }) => "unrecognized",
                    Err(DispatchError::Handler { .. }) => "error",
                };
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                match &result {
                    Ok(()) => tracing::debug!(
                        family = E::FAMILY,
                        event_type = %event_type,
                        duration_ms,
                        "event dispatched"
                    ),
                    Err(err) => tracing::warn!(
                        family = E::FAMILY,
                        event_type = %event_type,
                        duration_ms,
                        error = %err,
                        "event dispatch failed"
                    ),
                }

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
