//! Handlers for the vehicle collection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fleet_core::error::CoreError;
use fleet_core::types::VehicleId;
use fleet_core::vehicle::VehicleInput;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Parse a path id. Anything that is not a valid identifier cannot name a
/// stored vehicle, so it is reported as not found.
fn parse_id(raw: &str) -> Result<VehicleId, AppError> {
    raw.parse::<VehicleId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Core(CoreError::vehicle_not_found(raw)))
}

/// GET /vehicles
///
/// All vehicles, sorted by name.
pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let vehicles = state.store.list_all().await?;
    Ok(Json(vehicles))
}

/// GET /vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id)?;
    let vehicle = state
        .store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::vehicle_not_found(id)))?;

    Ok(Json(vehicle))
}

/// POST /vehicles
///
/// Validate and create a vehicle. Responds 201 with the stored record.
pub async fn create_vehicle(
    State(state): State<AppState>,
    payload: Result<Json<VehicleInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let vehicle = state.store.insert(&input).await?;

    tracing::info!(
        vehicle_id = vehicle.id,
        name = %vehicle.name,
        status = %vehicle.status,
        "Vehicle created",
    );

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// PUT /vehicles/{id}
///
/// Partial update: fields present in the body replace the stored ones and
/// the merged record is revalidated.
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<VehicleInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&raw_id)?;
    let Json(patch) = payload?;

    let vehicle = state
        .store
        .update_by_id(id, &patch)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::vehicle_not_found(id)))?;

    tracing::info!(vehicle_id = vehicle.id, km = vehicle.km, "Vehicle updated");

    Ok(Json(vehicle))
}
