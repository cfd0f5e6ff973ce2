//! Tower middleware layers for the dispatch pipeline.
//!
//! - [`trace`]: Per-event `tracing` span with timing and outcome
//! - [`pipeline`]: Composes the layers over an [`EventDispatcher`](crate::service::dispatch::EventDispatcher)

pub mod pipeline;
pub mod trace;

pub use pipeline::{build_dispatch_pipeline, DispatchPipeline, HubPipeline, SensorPipeline};
pub use trace::{DispatchTraceLayer, DispatchTraceService};
