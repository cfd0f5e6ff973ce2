//! Sensor events: readings reported by a single device through its hub.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TypedEvent;
use crate::validation::{Validate, ValidationErrors};

/// Discriminator for [`SensorEvent`] payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorEventType {
    MotionSensorEvent,
    TemperatureSensorEvent,
    LightSensorEvent,
    ClimateSensorEvent,
    SwitchSensorEvent,
}

impl SensorEventType {
    /// Every sensor event type, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::MotionSensorEvent,
        Self::TemperatureSensorEvent,
        Self::LightSensorEvent,
        Self::ClimateSensorEvent,
        Self::SwitchSensorEvent,
    ];

    /// Wire name, identical to the JSON `type` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MotionSensorEvent => "MOTION_SENSOR_EVENT",
            Self::TemperatureSensorEvent => "TEMPERATURE_SENSOR_EVENT",
            Self::LightSensorEvent => "LIGHT_SENSOR_EVENT",
            Self::ClimateSensorEvent => "CLIMATE_SENSOR_EVENT",
            Self::SwitchSensorEvent => "SWITCH_SENSOR_EVENT",
        }
    }
}

impl fmt::Display for SensorEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading reported by one sensor.
///
/// `id` and `hub_id` default to empty when absent so that a missing value is
/// reported as a field violation rather than a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorEvent {
    /// Sensor identifier.
    #[serde(default)]
    pub id: String,
    /// Identifier of the hub the sensor is attached to.
    #[serde(default)]
    pub hub_id: String,
    /// When the reading was taken. Defaults to the time of decoding.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: SensorPayload,
}

/// Type-specific part of a [`SensorEvent`], selected by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorPayload {
    MotionSensorEvent(MotionSensorEvent),
    TemperatureSensorEvent(TemperatureSensorEvent),
    LightSensorEvent(LightSensorEvent),
    ClimateSensorEvent(ClimateSensorEvent),
    SwitchSensorEvent(SwitchSensorEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSensorEvent {
    pub link_quality: i32,
    pub motion: bool,
    pub voltage: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSensorEvent {
    pub temperature_c: i32,
    pub temperature_f: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSensorEvent {
    pub link_quality: i32,
    pub luminosity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateSensorEvent {
    pub temperature_c: i32,
    pub humidity: i32,
    pub co2_level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSensorEvent {
    pub state: bool,
}

impl TypedEvent for SensorEvent {
    type Kind = SensorEventType;

    const FAMILY: &'static str = "sensor";

    fn kind(&self) -> SensorEventType {
        match self.payload {
            SensorPayload::MotionSensorEvent(_) => SensorEventType::MotionSensorEvent,
            SensorPayload::TemperatureSensorEvent(_) => SensorEventType::TemperatureSensorEvent,
            SensorPayload::LightSensorEvent(_) => SensorEventType::LightSensorEvent,
            SensorPayload::ClimateSensorEvent(_) => SensorEventType::ClimateSensorEvent,
            SensorPayload::SwitchSensorEvent(_) => SensorEventType::SwitchSensorEvent,
        }
    }

    fn routing_key(&self) -> &str {
        &self.hub_id
    }
}

impl Validate for SensorEvent {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        errors.not_blank("id", &self.id);
        errors.not_blank("hubId", &self.hub_id);
    }
}
