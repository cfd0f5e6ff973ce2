//! Delivery persistence boundary.
//!
//! Defines [`DeliveryStore`], the transactional store the delivery service
//! writes through, and [`DeliveryTransaction`], the unit of work opened by
//! [`DeliveryStore::begin`]. Every state-mutating operation runs inside one
//! transaction and ends in exactly one of `commit()` or `rollback()`.

use async_trait::async_trait;
use depot_core::Delivery;
use uuid::Uuid;

/// Transactional persistence for delivery records.
///
/// Used as `Arc<dyn DeliveryStore>` so backends can be swapped at wiring
/// time. Implementations: in-memory ([`InMemoryDeliveryStore`](super::engines::InMemoryDeliveryStore)).
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Opens a new transaction.
    async fn begin(&self) -> anyhow::Result<Box<dyn DeliveryTransaction>>;

    /// Reads a committed record outside any transaction.
    async fn find(&self, delivery_id: Uuid) -> anyhow::Result<Option<Delivery>>;
}

/// A unit of work over the delivery store.
///
/// Writes are visible to reads through the same transaction immediately and
/// to everyone else only after [`commit`](DeliveryTransaction::commit).
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait DeliveryTransaction: Send {
    /// Reads a record, including writes staged in this transaction.
    async fn find(&mut self, delivery_id: Uuid) -> anyhow::Result<Option<Delivery>>;

    /// Inserts or replaces a record.
    async fn save(&mut self, delivery: Delivery) -> anyhow::Result<()>;

    /// Makes all staged writes visible.
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;

    /// Discards all staged writes.
    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}
