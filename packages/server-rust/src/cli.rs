//! Command-line and environment configuration for the `depot` binary.

use std::time::Duration;

use clap::Parser;
use depot_core::Address;

use crate::logging::LogFormat;
use crate::network::NetworkConfig;
use crate::service::config::{DEFAULT_HUB_TOPIC, DEFAULT_SENSOR_TOPIC};
use crate::service::{ServiceConfig, TransitionPolicy};

/// Telemetry collector, delivery and warehouse services on one listener.
#[derive(Debug, Clone, Parser)]
#[command(name = "depot", version, about)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "DEPOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 picks a free port).
    #[arg(long, env = "DEPOT_PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "DEPOT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Base URL of the order service. Notifications are only logged when unset.
    #[arg(long, env = "DEPOT_ORDER_URL")]
    pub order_url: Option<String>,

    /// Base URL of a remote warehouse. The local warehouse is used when unset.
    #[arg(long, env = "DEPOT_WAREHOUSE_URL")]
    pub warehouse_url: Option<String>,

    #[arg(long, env = "DEPOT_WAREHOUSE_COUNTRY", default_value = "")]
    pub warehouse_country: String,

    #[arg(long, env = "DEPOT_WAREHOUSE_CITY", default_value = "")]
    pub warehouse_city: String,

    #[arg(long, env = "DEPOT_WAREHOUSE_STREET", default_value = "")]
    pub warehouse_street: String,

    #[arg(long, env = "DEPOT_WAREHOUSE_HOUSE", default_value = "")]
    pub warehouse_house: String,

    #[arg(long, env = "DEPOT_WAREHOUSE_FLAT", default_value = "")]
    pub warehouse_flat: String,

    /// Prior-state checking for delivery transitions.
    #[arg(long, env = "DEPOT_TRANSITION_POLICY", value_enum, default_value_t = TransitionPolicy::Lenient)]
    pub transition_policy: TransitionPolicy,

    #[arg(long, env = "DEPOT_SENSOR_TOPIC", default_value = DEFAULT_SENSOR_TOPIC)]
    pub sensor_topic: String,

    #[arg(long, env = "DEPOT_HUB_TOPIC", default_value = DEFAULT_HUB_TOPIC)]
    pub hub_topic: String,

    /// Allowed CORS origins, comma separated.
    #[arg(long, env = "DEPOT_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "DEPOT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Timeout for calls to the order service and remote warehouse.
    #[arg(long, env = "DEPOT_CLIENT_TIMEOUT_SECS", default_value_t = 10)]
    pub client_timeout_secs: u64,

    #[arg(long, env = "DEPOT_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,
}

impl Cli {
    #[must_use]
    pub fn warehouse_address(&self) -> Address {
        Address {
            country: self.warehouse_country.clone(),
            city: self.warehouse_city.clone(),
            street: self.warehouse_street.clone(),
            house: self.warehouse_house.clone(),
            flat: self.warehouse_flat.clone(),
        }
    }

    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            warehouse_address: self.warehouse_address(),
            transition_policy: self.transition_policy,
            sensor_topic: self.sensor_topic.clone(),
            hub_topic: self.hub_topic.clone(),
        }
    }

    #[must_use]
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}
