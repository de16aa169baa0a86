pub mod vehicles;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the application route tree.
///
/// ```text
/// /                         service status
/// /health                   store health
///
/// /vehicles                 list, create
/// /vehicles/{id}            get, update
/// /api/vehicles             list, create (alias)
/// /api/vehicles/{id}        get, update (alias)
///
/// /api/init                 reseed sample fleet (POST)
///
/// /ws                       WebSocket change stream
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health_check))
        .nest("/vehicles", vehicles::router())
        .nest("/api/vehicles", vehicles::router())
        .route("/api/init", post(handlers::admin::reseed))
        .route("/ws", get(ws::ws_handler))
}
