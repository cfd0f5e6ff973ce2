//! Pipeline composition: wraps an event dispatcher with its middleware stack.

use std::sync::Arc;

use depot_core::{HubEvent, SensorEvent, TypedEvent};
use tower::ServiceBuilder;

use super::trace::{DispatchTraceLayer, DispatchTraceService};
use crate::service::dispatch::EventDispatcher;
use crate::service::registry::HandlerRegistry;

/// Dispatch pipeline for one event family.
pub type DispatchPipeline<E> = DispatchTraceService<EventDispatcher<E>>;

pub type SensorPipeline = DispatchPipeline<SensorEvent>;
pub type HubPipeline = DispatchPipeline<HubEvent>;

/// Builds the dispatch pipeline for `registry`.
///
/// Layer order (outermost to innermost):
/// 1. `DispatchTraceLayer` -- span per event with timing and outcome
/// 2. `EventDispatcher` -- registry lookup and handler invocation
///
/// The returned service is `Clone`; clones share the registry.
#[must_use]
pub fn build_dispatch_pipeline<E: TypedEvent>(
    registry: Arc<HandlerRegistry<E>>,
) -> DispatchPipeline<E> {
    ServiceBuilder::new()
        .layer(DispatchTraceLayer)
        .service(EventDispatcher::new(registry))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
