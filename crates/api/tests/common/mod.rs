#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use fleet_api::config::ServerConfig;
use fleet_api::router::build_app_router;
use fleet_api::state::AppState;
use fleet_api::ws::SubscriberRegistry;
use fleet_db::MemoryVehicleStore;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        environment: "test".to_string(),
        init_token: None,
        change_event_name: "vehicle-change".to_string(),
        static_dir: None,
        request_timeout_secs: 30,
        json_logs: false,
    }
}

/// A router plus handles on the in-memory backend behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryVehicleStore>,
    pub registry: Arc<SubscriberRegistry>,
}

/// Build the full application router over an in-memory store.
///
/// Goes through `build_app_router`, so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) as production.
pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryVehicleStore::new());
    let registry = Arc::new(SubscriberRegistry::new());

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
        registry: registry.clone(),
    };

    TestApp {
        router: build_app_router(state).unwrap(),
        store,
        registry,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

/// The Bus 101 payload used across tests.
pub fn bus_101() -> serde_json::Value {
    serde_json::json!({
        "name": "Bus 101",
        "status": "on-road",
        "km": 125000,
        "oilChangeDue": 130000,
        "safetyDue": "2024-12-31",
        "drivers": ["John Smith"]
    })
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: &serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
