use async_trait::async_trait;
use depot_core::Address;
use serde::Serialize;
use uuid::Uuid;

/// Order-management service, notified as a delivery moves through its lifecycle.
/// Implementations: HTTP (`HttpOrderClient`), log-only (`LoggingOrderClient`).
#[async_trait]
pub trait OrderClient: Send + Sync {
    /// The delivery was picked up from the warehouse and the order is being assembled.
    async fn assembly(&self, order_id: Uuid) -> anyhow::Result<()>;

    /// The delivery reached its destination.
    async fn completed(&self, order_id: Uuid) -> anyhow::Result<()>;

    /// The delivery could not be completed.
    async fn delivery_failed(&self, order_id: Uuid) -> anyhow::Result<()>;
}

/// Read-only lookup of the warehouse origin address.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    async fn warehouse_address(&self) -> anyhow::Result<Address>;
}

/// An accepted telemetry event on its way downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Destination topic (one per event family).
    pub topic: String,
    /// Partitioning key, the hub identifier.
    pub key: String,
    /// Wire name of the event type.
    pub event_type: String,
    /// The full event as JSON.
    pub payload: serde_json::Value,
}

/// Downstream destination for accepted telemetry events.
/// The broker itself is external; implementations adapt to it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, record: EventRecord) -> anyhow::Result<()>;
}
