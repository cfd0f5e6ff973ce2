//! Telemetry collector endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use depot_core::{HubEvent, SensorEvent, TypedEvent};
use tower::ServiceExt;
use tracing::info;

use super::AppState;
use crate::network::error::ApiError;
use crate::network::extract::ValidJson;

/// `POST /events/sensors`: validates and dispatches one sensor event.
pub async fn collect_sensor_event(
    State(state): State<AppState>,
    ValidJson(event): ValidJson<SensorEvent>,
) -> Result<StatusCode, ApiError> {
    info!(event_type = %event.kind(), hub_id = %event.hub_id, sensor_id = %event.id, "sensor event received");
    state.sensors.oneshot(event).await?;
    Ok(StatusCode::OK)
}

/// `POST /events/hubs`: validates and dispatches one hub event.
pub async fn collect_hub_event(
    State(state): State<AppState>,
    ValidJson(event): ValidJson<HubEvent>,
) -> Result<StatusCode, ApiError> {
    info!(event_type = %event.kind(), hub_id = %event.hub_id, "hub event received");
    state.hubs.oneshot(event).await?;
    Ok(StatusCode::OK)
}
