//! Event dispatch: routes each typed event to the handler registered for its type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use depot_core::TypedEvent;
use tower::Service;

use super::error::DispatchError;
use super::registry::HandlerRegistry;

type DispatchFuture = Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send>>;

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Routes events of family `E` to their handlers by `event.kind()`.
///
/// Each call is independent and single-shot: one lookup, at most one handler
/// invocation, no retry. Events with no registered handler fail with
/// [`DispatchError::Unrecognized`] without touching any handler.
///
/// Cloning is cheap; clones share the same immutable registry.
pub struct EventDispatcher<E: TypedEvent> {
    registry: Arc<HandlerRegistry<E>>,
}

impl<E: TypedEvent> EventDispatcher<E> {
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry<E>>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher routes through.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry<E> {
        &self.registry
    }

    /// Hands `event` to the handler registered for its type.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Unrecognized`] when no handler is registered for the type
    /// - [`DispatchError::Handler`] when the handler itself fails
    pub async fn dispatch(&self, event: E) -> Result<(), DispatchError> {
        let kind = event.kind();
        let Some(handler) = self.registry.get(kind) else {
            return Err(DispatchError::Unrecognized {
                family: E::FAMILY,
                kind: kind.to_string(),
            });
        };
        handler
            .handle(&event)
            .await
            .map_err(|source| DispatchError::Handler {
                kind: kind.to_string(),
                source,
            })
    }
}

impl<E: TypedEvent> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: TypedEvent> Service<E> for EventDispatcher<E> {
    type Response = ();
    type Error = DispatchError;
    type Future = DispatchFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: E) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.dispatch(event).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use depot_core::events::{
        SensorEvent, SensorEventType, SensorPayload, SwitchSensorEvent, TemperatureSensorEvent,
    };
    use proptest::prelude::*;
    use tower::ServiceExt;

    use super::*;
    use crate::service::error::HandlerError;
    use crate::service::registry::EventHandler;

    /// Handler that counts its invocations.
    struct CountingHandler {
        kind: SensorEventType,
        calls: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler<SensorEvent> for CountingHandler {
        fn event_type(&self) -> SensorEventType {
            self.kind
        }

        async fn handle(&self, event: &SensorEvent) -> Result<(), HandlerError> {
            assert_eq!(depot_core::TypedEvent::kind(event), self.kind);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HandlerError::Forward(anyhow::anyhow!("sink unavailable")));
            }
            Ok(())
        }
    }

    fn sample_payload(kind: SensorEventType) -> SensorPayload {
        use depot_core::events::{
            ClimateSensorEvent, LightSensorEvent, MotionSensorEvent,
        };
        match kind {
            SensorEventType::MotionSensorEvent => SensorPayload::MotionSensorEvent(MotionSensorEvent {
                link_quality: 90,
                motion: true,
                voltage: 3,
            }),
            SensorEventType::TemperatureSensorEvent => {
                SensorPayload::TemperatureSensorEvent(TemperatureSensorEvent {
                    temperature_c: 20,
                    temperature_f: 68,
                })
            }
            SensorEventType::LightSensorEvent => SensorPayload::LightSensorEvent(LightSensorEvent {
                link_quality: 90,
                luminosity: 200,
            }),
            SensorEventType::ClimateSensorEvent => {
                SensorPayload::ClimateSensorEvent(ClimateSensorEvent {
                    temperature_c: 20,
                    humidity: 45,
                    co2_level: 500,
                })
            }
            SensorEventType::SwitchSensorEvent => {
                SensorPayload::SwitchSensorEvent(SwitchSensorEvent { state: true })
            }
        }
    }

    fn make_event(kind: SensorEventType) -> SensorEvent {
        SensorEvent {
            id: "sensor-1".to_string(),
            hub_id: "hub-1".to_string(),
            timestamp: Utc::now(),
            payload: sample_payload(kind),
        }
    }

    /// Builds a dispatcher over `registered`, returning per-type call counters.
    fn dispatcher_for(
        registered: &[SensorEventType],
    ) -> (EventDispatcher<SensorEvent>, Vec<(SensorEventType, Arc<AtomicU32>)>) {
        let counters: Vec<_> = registered
            .iter()
            .map(|kind| (*kind, Arc::new(AtomicU32::new(0))))
            .collect();
        let handlers: Vec<Arc<dyn EventHandler<SensorEvent>>> = counters
            .iter()
            .map(|(kind, calls)| {
                Arc::new(CountingHandler {
                    kind: *kind,
                    calls: Arc::clone(calls),
                    fail: false,
                }) as Arc<dyn EventHandler<SensorEvent>>
            })
            .collect();
        let registry = HandlerRegistry::from_handlers(handlers).unwrap();
        (EventDispatcher::new(Arc::new(registry)), counters)
    }

    #[tokio::test]
    async fn routes_to_registered_handler() {
        let (dispatcher, counters) = dispatcher_for(&[
            SensorEventType::SwitchSensorEvent,
            SensorEventType::TemperatureSensorEvent,
        ]);

        dispatcher
            .dispatch(make_event(SensorEventType::TemperatureSensorEvent))
            .await
            .unwrap();

        assert_eq!(counters[0].1.load(Ordering::SeqCst), 0);
        assert_eq!(counters[1].1.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unregistered_type_is_unrecognized() {
        let (dispatcher, counters) = dispatcher_for(&[SensorEventType::SwitchSensorEvent]);

        let err = dispatcher
            .dispatch(make_event(SensorEventType::LightSensorEvent))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Unrecognized { family: "sensor", ref kind } if kind == "LIGHT_SENSOR_EVENT"
        ));
        assert_eq!(counters[0].1.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failure_is_propagated() {
        let calls = Arc::new(AtomicU32::new(0));
        let registry = HandlerRegistry::builder()
            .register(CountingHandler {
                kind: SensorEventType::SwitchSensorEvent,
                calls: Arc::clone(&calls),
                fail: true,
            })
            .unwrap()
            .build();
        let dispatcher = EventDispatcher::new(Arc::new(registry));

        let err = dispatcher
            .dispatch(make_event(SensorEventType::SwitchSensorEvent))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Handler { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn works_as_tower_service() {
        let (dispatcher, counters) = dispatcher_for(&[SensorEventType::MotionSensorEvent]);

        dispatcher
            .oneshot(make_event(SensorEventType::MotionSensorEvent))
            .await
            .unwrap();

        assert_eq!(counters[0].1.load(Ordering::SeqCst), 1);
    }

    fn any_kind() -> impl Strategy<Value = SensorEventType> {
        prop::sample::select(SensorEventType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn invokes_exactly_the_matching_handler_once(
            registered in prop::sample::subsequence(SensorEventType::ALL.to_vec(), 0..=5),
            kind in any_kind(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (dispatcher, counters) = dispatcher_for(&registered);

            let result = runtime.block_on(dispatcher.dispatch(make_event(kind)));

            let is_registered = registered.contains(&kind);
            prop_assert_eq!(result.is_ok(), is_registered);
            if !is_registered {
                let unrecognized = matches!(result, Err(DispatchError::Unrecognized { .. }));
                prop_assert!(unrecognized);
            }
            for (handler_kind, calls) in &counters {
                let expected = u32::from(*handler_kind == kind);
                prop_assert_eq!(calls.load(Ordering::SeqCst), expected);
            }
        }
    }
}
