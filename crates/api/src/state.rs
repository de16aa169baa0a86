use std::sync::Arc;

use fleet_db::VehicleStore;

use crate::config::ServerConfig;
use crate::ws::SubscriberRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Vehicle record store (Postgres in production, in-memory in tests).
    pub store: Arc<dyn VehicleStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Connected real-time clients.
    pub registry: Arc<SubscriberRegistry>,
}
