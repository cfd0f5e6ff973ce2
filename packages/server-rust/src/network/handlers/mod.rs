//! HTTP handler definitions for the `depot` server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for building the router.

pub mod delivery;
pub mod events;
pub mod health;
pub mod warehouse;

pub use delivery::{delivery_cost, delivery_failed, delivery_picked, delivery_successful, plan_delivery};
pub use events::{collect_hub_event, collect_sensor_event};
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use warehouse::warehouse_address;

use std::sync::Arc;
use std::time::Instant;

use super::ShutdownController;
use crate::service::{DeliveryService, HubPipeline, SensorPipeline, WarehouseService};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references and cheaply cloneable pipelines.
#[derive(Clone)]
pub struct AppState {
    /// Dispatch pipeline for sensor events.
    pub sensors: SensorPipeline,
    /// Dispatch pipeline for hub events.
    pub hubs: HubPipeline,
    pub deliveries: Arc<DeliveryService>,
    pub warehouse: Arc<WarehouseService>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
