//! Warehouse address lookup over HTTP.

use anyhow::Context as _;
use async_trait::async_trait;
use depot_core::Address;

use super::endpoint;
use crate::traits::WarehouseClient;

/// Fetches the warehouse address from `GET {base}/api/v1/warehouse/address`.
#[derive(Debug, Clone)]
pub struct HttpWarehouseClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWarehouseClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WarehouseClient for HttpWarehouseClient {
    async fn warehouse_address(&self) -> anyhow::Result<Address> {
        let url = endpoint(&self.base_url, "/api/v1/warehouse/address");
        self.client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("warehouse rejected GET {url}"))?
            .json::<Address>()
            .await
            .context("warehouse returned an invalid address")
    }
}
