//! `Depot` Server: telemetry collector, delivery and warehouse services over HTTP.

pub mod cli;
pub mod clients;
pub mod logging;
pub mod network;
pub mod service;
pub mod storage;
pub mod traits;

pub use traits::{EventRecord, EventSink, OrderClient, WarehouseClient};
