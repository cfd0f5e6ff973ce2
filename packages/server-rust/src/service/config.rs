use depot_core::Address;

/// Topic accepted sensor events are forwarded to.
pub const DEFAULT_SENSOR_TOPIC: &str = "telemetry.sensors.v1";
/// Topic accepted hub events are forwarded to.
pub const DEFAULT_HUB_TOPIC: &str = "telemetry.hubs.v1";

/// How strictly delivery transitions check the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransitionPolicy {
    /// Any transition is accepted; only the delivery's existence is checked.
    #[default]
    Lenient,
    /// Only lifecycle edges and same-state re-entry are accepted.
    Strict,
}

impl TransitionPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

/// Service-level configuration for the domain services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Origin address the warehouse reports.
    pub warehouse_address: Address,
    /// Prior-state validation for delivery transitions.
    pub transition_policy: TransitionPolicy,
    pub sensor_topic: String,
    pub hub_topic: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            warehouse_address: Address::default(),
            transition_policy: TransitionPolicy::default(),
            sensor_topic: DEFAULT_SENSOR_TOPIC.to_string(),
            hub_topic: DEFAULT_HUB_TOPIC.to_string(),
        }
    }
}
