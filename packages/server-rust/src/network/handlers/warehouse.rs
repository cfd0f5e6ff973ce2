//! Warehouse endpoints under `/api/v1/warehouse`.

use axum::extract::State;
use axum::Json;
use depot_core::Address;

use super::AppState;

/// `GET /api/v1/warehouse/address`
pub async fn warehouse_address(State(state): State<AppState>) -> Json<Address> {
    Json(state.warehouse.address().clone())
}
