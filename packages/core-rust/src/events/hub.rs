//! Hub events: device registration and automation scenario changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TypedEvent;
use crate::validation::{Validate, ValidationErrors};

/// Minimum length of a scenario name.
pub const SCENARIO_NAME_MIN_LEN: usize = 3;

/// Discriminator for [`HubEvent`] payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubEventType {
    DeviceAdded,
    DeviceRemoved,
    ScenarioAdded,
    ScenarioRemoved,
}

impl HubEventType {
    /// Every hub event type, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::DeviceAdded,
        Self::DeviceRemoved,
        Self::ScenarioAdded,
        Self::ScenarioRemoved,
    ];

    /// Wire name, identical to the JSON `type` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceAdded => "DEVICE_ADDED",
            Self::DeviceRemoved => "DEVICE_REMOVED",
            Self::ScenarioAdded => "SCENARIO_ADDED",
            Self::ScenarioRemoved => "SCENARIO_REMOVED",
        }
    }
}

impl fmt::Display for HubEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of device a hub can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    MotionSensor,
    TemperatureSensor,
    LightSensor,
    ClimateSensor,
    SwitchSensor,
}

/// Sensor reading a scenario condition looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    Motion,
    Luminosity,
    Switch,
    Temperature,
    #[serde(rename = "CO2LEVEL")]
    Co2Level,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperation {
    Equals,
    GreaterThan,
    LowerThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Activate,
    Deactivate,
    Inverse,
    SetValue,
}

/// An event reported by a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEvent {
    #[serde(default)]
    pub hub_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: HubPayload,
}

/// Type-specific part of a [`HubEvent`], selected by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubPayload {
    DeviceAdded(DeviceAddedEvent),
    DeviceRemoved(DeviceRemovedEvent),
    ScenarioAdded(ScenarioAddedEvent),
    ScenarioRemoved(ScenarioRemovedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAddedEvent {
    #[serde(default)]
    pub id: String,
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRemovedEvent {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioAddedEvent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<ScenarioCondition>,
    #[serde(default)]
    pub actions: Vec<DeviceAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRemovedEvent {
    #[serde(default)]
    pub name: String,
}

/// A predicate over one sensor's reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioCondition {
    #[serde(default)]
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub operation: ConditionOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

/// An action applied to one device when a scenario fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAction {
    #[serde(default)]
    pub sensor_id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

impl TypedEvent for HubEvent {
    type Kind = HubEventType;

    const FAMILY: &'static str = "hub";

    fn kind(&self) -> HubEventType {
        match self.payload {
            HubPayload::DeviceAdded(_) => HubEventType::DeviceAdded,
            HubPayload::DeviceRemoved(_) => HubEventType::DeviceRemoved,
            HubPayload::ScenarioAdded(_) => HubEventType::ScenarioAdded,
            HubPayload::ScenarioRemoved(_) => HubEventType::ScenarioRemoved,
        }
    }

    fn routing_key(&self) -> &str {
        &self.hub_id
    }
}

impl Validate for HubEvent {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        errors.not_blank("hubId", &self.hub_id);
        match &self.payload {
            HubPayload::DeviceAdded(e) => errors.not_blank("id", &e.id),
            HubPayload::DeviceRemoved(e) => errors.not_blank("id", &e.id),
            HubPayload::ScenarioAdded(e) => {
                scenario_name(errors, &e.name);
                errors.not_empty("conditions", &e.conditions);
                errors.not_empty("actions", &e.actions);
                for (i, condition) in e.conditions.iter().enumerate() {
                    errors.not_blank(&format!("conditions[{i}].sensorId"), &condition.sensor_id);
                }
                for (i, action) in e.actions.iter().enumerate() {
                    errors.not_blank(&format!("actions[{i}].sensorId"), &action.sensor_id);
                }
            }
            HubPayload::ScenarioRemoved(e) => scenario_name(errors, &e.name),
        }
    }
}

fn scenario_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().is_empty() {
        errors.push("name", "must not be blank");
    } else {
        errors.min_len("name", name, SCENARIO_NAME_MIN_LEN);
    }
}
