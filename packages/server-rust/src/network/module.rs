//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener and
//! `serve()` accepts requests until the shutdown future resolves. Services are
//! wired between `start()` and `serve()`.

use std::future::Future;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    collect_hub_event, collect_sensor_event, delivery_cost, delivery_failed, delivery_picked,
    delivery_successful, health_handler, liveness_handler, plan_delivery, readiness_handler,
    warehouse_address, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;

/// Assembles the axum router with all routes and middleware.
///
/// Routes:
/// - `GET /health`, `/health/live`, `/health/ready` -- probes
/// - `POST /events/sensors`, `/events/hubs` -- telemetry collector
/// - `PUT /api/v1/delivery` and `POST /api/v1/delivery/{picked,successful,failed,cost}`
/// - `GET /api/v1/warehouse/address`
///
/// Probes bypass in-flight tracking so they keep answering while draining.
pub fn build_router(config: &NetworkConfig, state: AppState) -> Router {
    let api = Router::new()
        .route("/events/sensors", post(collect_sensor_event))
        .route("/events/hubs", post(collect_hub_event))
        .route("/api/v1/delivery", put(plan_delivery))
        .route("/api/v1/delivery/picked", post(delivery_picked))
        .route("/api/v1/delivery/successful", post(delivery_successful))
        .route("/api/v1/delivery/failed", post(delivery_failed))
        .route("/api/v1/delivery/cost", post(delivery_cost))
        .route("/api/v1/warehouse/address", get(warehouse_address))
        .route_layer(from_fn_with_state(
            Arc::clone(&state.shutdown),
            track_in_flight,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(api)
        .layer(build_http_layers(config))
        .with_state(state)
}

/// Manages the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Shared shutdown controller; goes into [`AppState`].
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Binds the TCP listener and returns the bound port (OS-assigned for port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// After the signal:
    /// 1. Health state moves to Draining and new API requests get 503
    /// 2. Open connections finish their current request
    /// 3. Waits up to `drain_timeout` for in-flight requests
    /// 4. Health state moves to Stopped
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        self,
        state: AppState,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };
        let shutdown_ctrl = self.shutdown;
        let router = build_router(&self.config, state);

        shutdown_ctrl.set_ready();
        info!("Serving HTTP requests");

        let trigger = Arc::clone(&shutdown_ctrl);
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received");
                trigger.trigger_shutdown();
            })
            .await?;

        drain(&shutdown_ctrl, &self.config).await;
        Ok(())
    }
}

async fn drain(shutdown_ctrl: &ShutdownController, config: &NetworkConfig) {
    shutdown_ctrl.trigger_shutdown();

    let count = shutdown_ctrl.in_flight_count();
    if count > 0 {
        info!("Draining {} in-flight requests", count);
    }

    if shutdown_ctrl.wait_for_drain(config.drain_timeout).await {
        info!("All requests drained");
    } else {
        warn!("Drain timeout expired with in-flight requests remaining");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::network::handlers::test_support::test_state;
    use crate::network::HealthState;
    use crate::service::{build_dispatch_pipeline, HandlerRegistry};

    fn router(state: AppState) -> Router {
        build_router(&NetworkConfig::default(), state)
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn sensor_event() -> Value {
        json!({
            "id": "sensor.temperature.1",
            "hubId": "hub-1",
            "timestamp": "2024-08-06T15:11:24.157Z",
            "type": "TEMPERATURE_SENSOR_EVENT",
            "temperatureC": 22,
            "temperatureF": 72,
        })
    }

    fn new_delivery() -> Value {
        json!({
            "orderId": Uuid::new_v4(),
            "fromAddress": {"country": "C", "city": "ADDRESS_1", "street": "Warehouse street", "house": "1", "flat": "1"},
            "toAddress": {"country": "C", "city": "Town", "street": "Customer street", "house": "2", "flat": "3"},
        })
    }

    #[tokio::test]
    async fn accepts_valid_sensor_event_with_empty_body() {
        let (status, body) = send(
            router(test_state()),
            json_request("POST", "/events/sensors", &sensor_event()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn accepts_valid_hub_event() {
        let event = json!({
            "hubId": "hub-1",
            "type": "SCENARIO_ADDED",
            "name": "lights on",
            "conditions": [{"sensorId": "s1", "type": "MOTION", "operation": "EQUALS", "value": 1}],
            "actions": [{"sensorId": "s2", "type": "ACTIVATE"}],
        });

        let (status, _) = send(router(test_state()), json_request("POST", "/events/hubs", &event)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_type_is_rejected_with_envelope() {
        let mut event = sensor_event();
        event["type"] = json!("PRESSURE_SENSOR_EVENT");

        let (status, body) = send_json(
            router(test_state()),
            json_request("POST", "/events/sensors", &event),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["timestamp"].is_string());
        assert!(body["details"].as_str().unwrap().contains("PRESSURE_SENSOR_EVENT"));
    }

    #[tokio::test]
    async fn blank_hub_id_names_the_field() {
        let event = json!({"hubId": "  ", "type": "DEVICE_REMOVED", "id": "sensor-1"});

        let (status, body) = send_json(
            router(test_state()),
            json_request("POST", "/events/hubs", &event),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["details"], "hubId must not be blank");
    }

    #[tokio::test]
    async fn unregistered_type_is_bad_request_without_details() {
        let mut state = test_state();
        state.hubs = build_dispatch_pipeline(Arc::new(HandlerRegistry::builder().build()));
        let event = json!({"hubId": "hub-1", "type": "DEVICE_REMOVED", "id": "sensor-1"});

        let (status, body) = send_json(router(state), json_request("POST", "/events/hubs", &event)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "no handler registered for hub event type DEVICE_REMOVED"
        );
        assert!(body["details"].is_null());
    }

    #[tokio::test]
    async fn unknown_delivery_is_not_found() {
        for uri in [
            "/api/v1/delivery/picked",
            "/api/v1/delivery/successful",
            "/api/v1/delivery/failed",
        ] {
            let (status, body) = send_json(
                router(test_state()),
                json_request("POST", uri, &json!(Uuid::new_v4())),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["status"], 404);
        }
    }

    #[tokio::test]
    async fn cost_for_unknown_delivery_is_not_found() {
        let order = json!({
            "orderId": Uuid::new_v4(),
            "deliveryId": Uuid::new_v4(),
            "deliveryWeight": 2.0,
            "deliveryVolume": 1.0,
            "fragile": false,
            "totalPrice": 100.0,
        });

        let (status, _) = send_json(
            router(test_state()),
            json_request("POST", "/api/v1/delivery/cost", &order),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plan_pick_and_price_a_delivery() {
        let state = test_state();

        let (status, planned) = send_json(
            router(state.clone()),
            json_request("PUT", "/api/v1/delivery", &new_delivery()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(planned["deliveryState"], "CREATED");
        let delivery_id = planned["deliveryId"].clone();

        let (status, _) = send(
            router(state.clone()),
            json_request("POST", "/api/v1/delivery/picked", &delivery_id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let order = json!({
            "orderId": planned["orderId"],
            "deliveryId": delivery_id,
            "deliveryWeight": 2.0,
            "deliveryVolume": 1.0,
            "fragile": false,
        });
        let (status, cost) = send_json(
            router(state),
            json_request("POST", "/api/v1/delivery/cost", &order),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cost, json!(12.96));
    }

    #[tokio::test]
    async fn malformed_delivery_id_is_bad_request() {
        let (status, body) = send_json(
            router(test_state()),
            json_request("POST", "/api/v1/delivery/picked", &json!("not-a-uuid")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
    }

    #[tokio::test]
    async fn serves_warehouse_address() {
        let request = Request::builder()
            .uri("/api/v1/warehouse/address")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send_json(router(test_state()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], "ADDRESS_1");
        assert_eq!(body["street"], "Warehouse street");
    }

    #[tokio::test]
    async fn draining_refuses_api_but_keeps_probes() {
        let state = test_state();
        state.shutdown.set_ready();
        state.shutdown.trigger_shutdown();
        assert_eq!(state.shutdown.health_state(), HealthState::Draining);

        let (status, _) = send(
            router(state.clone()),
            json_request("POST", "/events/sensors", &sensor_event()),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let live = Request::builder().uri("/health/live").body(Body::empty()).unwrap();
        let (status, _) = send(router(state), live).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = NetworkModule::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        let port = module.start().await.unwrap();
        assert!(port > 0);
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_fails() {
        let module = NetworkModule::new(NetworkConfig::default());
        let err = module
            .serve(test_state(), std::future::ready(()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("start()"));
    }

    #[tokio::test]
    async fn serve_stops_after_signal() {
        let mut module = NetworkModule::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        module.start().await.unwrap();
        let shutdown = module.shutdown_controller();
        let mut state = test_state();
        state.shutdown = Arc::clone(&shutdown);

        module.serve(state, std::future::ready(())).await.unwrap();

        assert_eq!(shutdown.health_state(), HealthState::Stopped);
    }
}
