//! Order-service notifications.

use anyhow::Context as _;
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use super::endpoint;
use crate::traits::OrderClient;

/// Notifies the order service over HTTP. Each call posts the order id as a
/// JSON string and fails on any non-2xx response.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn notify(&self, path: &str, order_id: Uuid) -> anyhow::Result<()> {
        let url = endpoint(&self.base_url, path);
        debug!(%url, %order_id, "notifying order service");
        self.client
            .post(&url)
            .json(&order_id)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()
            .with_context(|| format!("order service rejected POST {url}"))?;
        Ok(())
    }
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn assembly(&self, order_id: Uuid) -> anyhow::Result<()> {
        self.notify("/api/v1/order/assembly", order_id).await
    }

    async fn completed(&self, order_id: Uuid) -> anyhow::Result<()> {
        self.notify("/api/v1/order/completed", order_id).await
    }

    async fn delivery_failed(&self, order_id: Uuid) -> anyhow::Result<()> {
        self.notify("/api/v1/order/delivery/failed", order_id).await
    }
}

/// Logs notifications instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOrderClient;

#[async_trait]
impl OrderClient for LoggingOrderClient {
    async fn assembly(&self, order_id: Uuid) -> anyhow::Result<()> {
        info!(%order_id, notice = "assembly", "order notification");
        Ok(())
    }

    async fn completed(&self, order_id: Uuid) -> anyhow::Result<()> {
        info!(%order_id, notice = "completed", "order notification");
        Ok(())
    }

    async fn delivery_failed(&self, order_id: Uuid) -> anyhow::Result<()> {
        info!(%order_id, notice = "delivery_failed", "order notification");
        Ok(())
    }
}
