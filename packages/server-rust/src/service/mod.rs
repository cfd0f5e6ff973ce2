//! Event dispatch and domain services.
//!
//! 1. **Registry** (`registry`): immutable event-type -> handler mapping
//! 2. **Dispatch** (`dispatch`): `tower::Service` routing each event to its handler
//! 3. **Middleware** (`middleware`): Tower layers around the dispatcher
//! 4. **Domain services** (`domain`): telemetry handlers, delivery, warehouse

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod registry;

// Re-export key types for convenient access.
pub use config::{ServiceConfig, TransitionPolicy};
pub use dispatch::EventDispatcher;
pub use domain::{DeliveryService, WarehouseService};
pub use error::{DeliveryError, DispatchError, HandlerError, RegistryError};
pub use middleware::{build_dispatch_pipeline, HubPipeline, SensorPipeline};
pub use registry::{EventHandler, HandlerRegistry, HandlerRegistryBuilder};
