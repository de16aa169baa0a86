//! Integration tests for the vehicle endpoints, driven through the full
//! router over the in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, bus_101, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: create, list, partial update, get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bus_101_round_trip() {
    let test = build_test_app();
    let app = &test.router;

    let response = post_json(app, "/vehicles", &bus_101()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Bus 101");
    assert_eq!(created["comment"], "");
    assert!(created["lastUpdated"].is_string());

    let list = body_json(get(app, "/vehicles").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);

    let response = put_json(app, &format!("/vehicles/{id}"), &json!({ "km": 126000 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["km"], 126000.0);

    let fetched = body_json(get(app, &format!("/vehicles/{id}")).await).await;
    assert_eq!(fetched["km"], 126000.0);
    assert_eq!(fetched["name"], "Bus 101");
    assert_eq!(fetched["status"], "on-road");
    assert_eq!(fetched["oilChangeDue"], 130000.0);
    assert_eq!(fetched["safetyDue"], "2024-12-31");
    assert_eq!(fetched["drivers"], json!(["John Smith"]));
    assert_eq!(fetched["createdAt"], created["createdAt"]);
    assert_ne!(fetched["lastUpdated"], created["lastUpdated"]);
}

// ---------------------------------------------------------------------------
// Test: text fields are stored exactly as sent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn padded_text_round_trips_unchanged() {
    let test = build_test_app();
    let app = &test.router;

    let mut payload = bus_101();
    payload["name"] = json!(" Bus 101 ");
    payload["drivers"] = json!([" John Smith "]);

    let created = body_json(post_json(app, "/vehicles", &payload).await).await;
    let id = created["id"].as_i64().unwrap();

    let fetched = body_json(get(app, &format!("/vehicles/{id}")).await).await;
    assert_eq!(fetched["name"], " Bus 101 ");
    assert_eq!(fetched["drivers"], json!([" John Smith "]));
}

// ---------------------------------------------------------------------------
// Test: /api/vehicles is an alias of /vehicles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_prefix_serves_same_collection() {
    let test = build_test_app();
    let app = &test.router;

    let created = body_json(post_json(app, "/api/vehicles", &bus_101()).await).await;
    let id = created["id"].as_i64().unwrap();

    let fetched = body_json(get(app, &format!("/vehicles/{id}")).await).await;
    assert_eq!(fetched["name"], "Bus 101");

    let list = body_json(get(app, "/api/vehicles").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: listing is sorted by name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_sorted_by_name() {
    let test = build_test_app();
    let app = &test.router;

    for name in ["Van 9", "Bus 2", "Truck 5"] {
        let mut payload = bus_101();
        payload["name"] = json!(name);
        let response = post_json(app, "/vehicles", &payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let list = body_json(get(app, "/vehicles").await).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bus 2", "Truck 5", "Van 9"]);
}

// ---------------------------------------------------------------------------
// Test: missing and malformed ids are 404 with the vehicle message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_vehicle_returns_404() {
    let test = build_test_app();
    let app = &test.router;

    for uri in ["/vehicles/999", "/vehicles/not-an-id", "/api/vehicles/0"] {
        let response = get(app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Vehicle not found");
        assert_eq!(json["code"], "NOT_FOUND");
    }

    let response = put_json(app, "/vehicles/999", &json!({ "km": 1 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: invalid create lists every violated field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_create_returns_violations() {
    let test = build_test_app();
    let app = &test.router;

    let mut payload = bus_101();
    payload["km"] = json!(-10);
    payload["drivers"] = json!([]);

    let response = post_json(app, "/vehicles", &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["drivers", "km"]);

    let list = body_json(get(app, "/vehicles").await).await;
    assert!(list.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: an update that would empty drivers is rejected and not applied
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_update_leaves_record_unchanged() {
    let test = build_test_app();
    let app = &test.router;

    let created = body_json(post_json(app, "/vehicles", &bus_101()).await).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(app, &format!("/vehicles/{id}"), &json!({ "drivers": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(app, &format!("/vehicles/{id}"), &json!({ "oilChangeDue": -1 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let fetched = body_json(get(app, &format!("/vehicles/{id}")).await).await;
    assert_eq!(fetched, created);
}

// ---------------------------------------------------------------------------
// Test: malformed JSON is a 400 with a JSON error body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_json_returns_400() {
    let test = build_test_app();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/vehicles")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(test.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

// ---------------------------------------------------------------------------
// Test: wrong field type surfaces as a 400, not a 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_field_type_returns_400() {
    let test = build_test_app();
    let mut payload = bus_101();
    payload["km"] = json!("a lot");

    let response = post_json(&test.router, "/vehicles", &payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: store outage maps to 500 STORE_UNAVAILABLE without leaking details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_outage_returns_500() {
    let test = build_test_app();
    test.store.set_available(false);

    let response = get(&test.router, "/vehicles").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert!(!json["error"].as_str().unwrap().contains("memory store"));

    let response = post_json(&test.router, "/vehicles", &bus_101()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
