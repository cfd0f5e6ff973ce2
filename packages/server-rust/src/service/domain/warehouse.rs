//! Warehouse service: reports the fixed origin address of shipments.

use async_trait::async_trait;
use depot_core::Address;

use crate::traits::WarehouseClient;

/// Serves the configured warehouse address.
///
/// Also acts as the in-process [`WarehouseClient`] when the delivery service
/// runs in the same binary.
#[derive(Debug, Clone, Default)]
pub struct WarehouseService {
    address: Address,
}

impl WarehouseService {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

#[async_trait]
impl WarehouseClient for WarehouseService {
    async fn warehouse_address(&self) -> anyhow::Result<Address> {
        Ok(self.address.clone())
    }
}
