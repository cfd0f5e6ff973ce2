//! Telemetry collector handlers.
//!
//! One handler per event type. Every handler forwards the accepted event to the
//! configured [`EventSink`] under its family's topic, keyed by hub id.

use std::sync::Arc;

use async_trait::async_trait;
use depot_core::events::{HubEvent, HubEventType, SensorEvent, SensorEventType};
use depot_core::TypedEvent;
use serde::Serialize;

use crate::service::error::HandlerError;
use crate::service::registry::EventHandler;
use crate::traits::{EventRecord, EventSink};

/// Serializes `event` and publishes it to `sink` under `topic`.
///
/// # Errors
///
/// [`HandlerError::Encode`] if the event does not serialize,
/// [`HandlerError::Forward`] if the sink rejects the record.
pub async fn forward<E>(sink: &dyn EventSink, topic: &str, event: &E) -> Result<(), HandlerError>
where
    E: TypedEvent + Serialize,
{
    let record = EventRecord {
        topic: topic.to_string(),
        key: event.routing_key().to_string(),
        event_type: event.kind().to_string(),
        payload: serde_json::to_value(event)?,
    };
    sink.publish(record).await.map_err(HandlerError::Forward)
}

// ---------------------------------------------------------------------------
// Macro for per-type forwarding handlers
// ---------------------------------------------------------------------------

/// Generate a handler bound to one event type that forwards to a sink.
macro_rules! forwarding_handler {
    (
        $(#[$meta:meta])*
        $name:ident, $event:ty, $kind:expr
    ) => {
        $(#[$meta])*
        pub struct $name {
            sink: Arc<dyn EventSink>,
            topic: Arc<str>,
        }

        impl $name {
            #[must_use]
            pub fn new(sink: Arc<dyn EventSink>, topic: impl Into<Arc<str>>) -> Self {
                Self {
                    sink,
                    topic: topic.into(),
                }
            }
        }

        #[async_trait]
        impl EventHandler<$event> for $name {
            fn event_type(&self) -> <$event as TypedEvent>::Kind {
                $kind
            }

            async fn handle(&self, event: &$event) -> Result<(), HandlerError> {
                forward(self.sink.as_ref(), &self.topic, event).await
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Sensor handlers
// ---------------------------------------------------------------------------

forwarding_handler!(
    /// Motion sensor readings.
    MotionSensorHandler, SensorEvent, SensorEventType::MotionSensorEvent
);

forwarding_handler!(
    /// Temperature sensor readings.
    TemperatureSensorHandler, SensorEvent, SensorEventType::TemperatureSensorEvent
);

forwarding_handler!(
    /// Light sensor readings.
    LightSensorHandler, SensorEvent, SensorEventType::LightSensorEvent
);

forwarding_handler!(
    /// Climate sensor readings.
    ClimateSensorHandler, SensorEvent, SensorEventType::ClimateSensorEvent
);

forwarding_handler!(
    /// Switch state changes.
    SwitchSensorHandler, SensorEvent, SensorEventType::SwitchSensorEvent
);

// ---------------------------------------------------------------------------
// Hub handlers
// ---------------------------------------------------------------------------

forwarding_handler!(
    /// A device was attached to a hub.
    DeviceAddedHandler, HubEvent, HubEventType::DeviceAdded
);

forwarding_handler!(
    /// A device was detached from a hub.
    DeviceRemovedHandler, HubEvent, HubEventType::DeviceRemoved
);

forwarding_handler!(
    /// A scenario was defined on a hub.
    ScenarioAddedHandler, HubEvent, HubEventType::ScenarioAdded
);

forwarding_handler!(
    /// A scenario was deleted from a hub.
    ScenarioRemovedHandler, HubEvent, HubEventType::ScenarioRemoved
);

/// One handler for every sensor event type.
#[must_use]
pub fn default_sensor_handlers(
    sink: &Arc<dyn EventSink>,
    topic: &str,
) -> Vec<Arc<dyn EventHandler<SensorEvent>>> {
    let topic: Arc<str> = Arc::from(topic);
    vec![
        Arc::new(MotionSensorHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(TemperatureSensorHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(LightSensorHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(ClimateSensorHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(SwitchSensorHandler::new(Arc::clone(sink), topic)),
    ]
}

/// One handler for every hub event type.
#[must_use]
pub fn default_hub_handlers(
    sink: &Arc<dyn EventSink>,
    topic: &str,
) -> Vec<Arc<dyn EventHandler<HubEvent>>> {
    let topic: Arc<str> = Arc::from(topic);
    vec![
        Arc::new(DeviceAddedHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(DeviceRemovedHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(ScenarioAddedHandler::new(Arc::clone(sink), Arc::clone(&topic))),
        Arc::new(ScenarioRemovedHandler::new(Arc::clone(sink), topic)),
    ]
}

// ---------------------------------------------------------------------------
// TracingEventSink
// ---------------------------------------------------------------------------

/// Sink that emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, record: EventRecord) -> anyhow::Result<()> {
        tracing::info!(
            topic = %record.topic,
            key = %record.key,
            event_type = %record.event_type,
            payload = %record.payload,
            "event forwarded"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
