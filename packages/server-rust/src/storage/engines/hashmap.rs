//! In-memory [`DeliveryStore`] backed by [`DashMap`].
//!
//! Committed records live in a shared `DashMap`; each transaction stages its
//! writes in a private map and applies them on commit. Concurrent
//! transactions are not isolated from each other: the last commit wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use depot_core::Delivery;
use uuid::Uuid;

use crate::storage::engine::{DeliveryStore, DeliveryTransaction};

/// In-memory delivery storage, cheap to clone (shares the underlying map).
#[derive(Clone, Default)]
pub struct InMemoryDeliveryStore {
    records: Arc<DashMap<Uuid, Delivery>>,
}

impl InMemoryDeliveryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn DeliveryTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            records: Arc::clone(&self.records),
            staged: HashMap::new(),
        }))
    }

    async fn find(&self, delivery_id: Uuid) -> anyhow::Result<Option<Delivery>> {
        Ok(self.records.get(&delivery_id).map(|r| r.value().clone()))
    }
}

/// Transaction over an [`InMemoryDeliveryStore`].
struct InMemoryTransaction {
    records: Arc<DashMap<Uuid, Delivery>>,
    staged: HashMap<Uuid, Delivery>,
}

#[async_trait]
impl DeliveryTransaction for InMemoryTransaction {
    async fn find(&mut self, delivery_id: Uuid) -> anyhow::Result<Option<Delivery>> {
        if let Some(staged) = self.staged.get(&delivery_id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.records.get(&delivery_id).map(|r| r.value().clone()))
    }

    async fn save(&mut self, delivery: Delivery) -> anyhow::Result<()> {
        self.staged.insert(delivery.delivery_id, delivery);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let Self { records, staged } = *self;
        for (id, delivery) in staged {
            records.insert(id, delivery);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}
