//! Administrative endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use fleet_core::seed::sample_fleet;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::ReseedAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReseedResponse {
    pub message: String,
    pub count: u64,
}

/// POST /api/init
///
/// Destructive: empties the collection and writes the fixed sample fleet.
pub async fn reseed(
    _auth: ReseedAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let fleet = sample_fleet();
    let count = state.store.bulk_replace(&fleet).await?;

    tracing::info!(count, "Vehicle collection reseeded");

    Ok(Json(ReseedResponse {
        message: format!("Database initialized with {count} vehicles"),
        count,
    }))
}
