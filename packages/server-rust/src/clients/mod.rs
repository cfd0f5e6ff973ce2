//! Collaborator clients: the order service and the warehouse.
//!
//! HTTP implementations use a shared `reqwest::Client` with a request timeout.
//! [`LoggingOrderClient`] stands in when no order service is configured.

pub mod order;
pub mod warehouse;

use std::time::Duration;

use anyhow::Context as _;

pub use order::{HttpOrderClient, LoggingOrderClient};
pub use warehouse::HttpWarehouseClient;

/// Timeout applied to every collaborator request.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client shared by collaborator clients.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("depot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

/// Joins `base` and an absolute `path`, tolerating a trailing slash on `base`.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
