//! Telemetry event schemas accepted by the collector.
//!
//! Two event families exist: [`SensorEvent`] (readings reported by a single
//! device) and [`HubEvent`] (topology and scenario changes reported by a
//! hub). Each family is an internally tagged enum: the `type` field of the
//! JSON object selects the payload variant, so an unknown `type` fails to
//! decode before any handler sees it.

pub mod hub;
pub mod sensor;

use std::fmt;
use std::hash::Hash;

pub use hub::{
    ActionType, ConditionOperation, ConditionType, DeviceAction, DeviceAddedEvent,
    DeviceRemovedEvent, DeviceType, HubEvent, HubEventType, HubPayload, ScenarioAddedEvent,
    ScenarioCondition, ScenarioRemovedEvent,
};
pub use sensor::{
    ClimateSensorEvent, LightSensorEvent, MotionSensorEvent, SensorEvent, SensorEventType,
    SensorPayload, SwitchSensorEvent, TemperatureSensorEvent,
};

/// An event that carries a closed discriminator identifying its handler.
///
/// `Kind` is the fieldless enum of all sub-types in the family. Handler
/// registries are keyed by it.
pub trait TypedEvent: Send + Sync + 'static {
    /// Discriminator type for this event family.
    type Kind: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Human-readable family name, used in logs.
    const FAMILY: &'static str;

    /// Returns the discriminator of this event.
    fn kind(&self) -> Self::Kind;

    /// Key used when forwarding the event downstream (the hub identifier).
    fn routing_key(&self) -> &str;
}
