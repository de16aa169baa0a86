//! Route definitions for the vehicle collection.

use axum::routing::get;
use axum::Router;

use crate::handlers::vehicles;
use crate::state::AppState;

/// Vehicle routes, mounted at both `/vehicles` and `/api/vehicles`.
///
/// ```text
/// GET  /       -> list_vehicles
/// POST /       -> create_vehicle
/// GET  /{id}   -> get_vehicle
/// PUT  /{id}   -> update_vehicle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/{id}",
            get(vehicles::get_vehicle).put(vehicles::update_vehicle),
        )
}
