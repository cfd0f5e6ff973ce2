//! Domain services.
//!
//! - [`telemetry`]: per-type handlers for sensor and hub events
//! - [`delivery`]: delivery planning, lifecycle and pricing
//! - [`warehouse`]: warehouse origin address

pub mod delivery;
pub mod telemetry;
pub mod warehouse;

pub use delivery::DeliveryService;
pub use telemetry::{default_hub_handlers, default_sensor_handlers, TracingEventSink};
pub use warehouse::WarehouseService;
