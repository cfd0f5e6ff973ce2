//! Delivery endpoints under `/api/v1/delivery`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use depot_core::{Delivery, NewDelivery, OrderPricing};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use crate::network::error::ApiError;
use crate::network::extract::JsonBody;

/// Delivery cost, written as a JSON number.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Cost(#[serde(with = "rust_decimal::serde::float")] pub Decimal);

/// `PUT /api/v1/delivery`
pub async fn plan_delivery(
    State(state): State<AppState>,
    JsonBody(new): JsonBody<NewDelivery>,
) -> Result<Json<Delivery>, ApiError> {
    Ok(Json(state.deliveries.plan(new).await?))
}

/// `POST /api/v1/delivery/picked`
pub async fn delivery_picked(
    State(state): State<AppState>,
    JsonBody(delivery_id): JsonBody<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.deliveries.pick(delivery_id).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/v1/delivery/successful`
pub async fn delivery_successful(
    State(state): State<AppState>,
    JsonBody(delivery_id): JsonBody<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.deliveries.succeed(delivery_id).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/v1/delivery/failed`
pub async fn delivery_failed(
    State(state): State<AppState>,
    JsonBody(delivery_id): JsonBody<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.deliveries.fail(delivery_id).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/v1/delivery/cost`
pub async fn delivery_cost(
    State(state): State<AppState>,
    JsonBody(order): JsonBody<OrderPricing>,
) -> Result<Json<Cost>, ApiError> {
    Ok(Json(Cost(state.deliveries.cost(&order).await?)))
}
