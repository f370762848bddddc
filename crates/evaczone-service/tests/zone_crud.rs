//! Integration tests for zone CRUD endpoints and health probes.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use evaczone_service::app;
use evaczone_service_shared::test_utils::{fixture_zones, test_state};

fn server() -> TestServer {
    TestServer::new(app(test_state())).expect("start test server")
}

#[tokio::test]
async fn list_returns_seeded_zones_in_id_order() {
    let server = server();

    let response = server.get("/api/v1/zones").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let zones = body["zones"].as_array().unwrap();
    assert_eq!(zones.len(), 6);
    assert_eq!(zones[0]["name"], fixture_zones::DOWNTOWN);
    assert_eq!(zones[5]["name"], fixture_zones::HIGHLAND);
}

#[tokio::test]
async fn list_filters_by_category() {
    let server = server();

    let response = server
        .get("/api/v1/zones")
        .add_query_param("category", "safe")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let zones = body["zones"].as_array().unwrap();
    assert_eq!(zones.len(), 2);
    assert!(zones.iter().all(|zone| zone["category"] == "safe"));
}

#[tokio::test]
async fn get_zone_by_id() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();

    let response = server.get(&format!("/api/v1/zones/{}", id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["zone"]["id"], id);
    assert_eq!(body["zone"]["name"], fixture_zones::DOWNTOWN);
}

#[tokio::test]
async fn get_unknown_zone_is_a_problem_document() {
    let server = server();

    let response = server.get("/api/v1/zones/9999").await;
    response.assert_status_not_found();
    assert_eq!(response.header("content-type"), "application/problem+json");

    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/zone-not-found");
    assert!(body["detail"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn create_zone_returns_created_row() {
    let server = server();

    let response = server
        .post("/api/v1/zones")
        .json(&json!({
            "name": "Riverside Alert Zone",
            "category": "hazard_medium",
            "latitude": 37.7600,
            "longitude": -122.3900,
            "radius_km": 0.7,
            "description": "Flash flood risk along the riverbank."
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["zone"]["id"].as_i64().unwrap();
    assert_eq!(body["zone"]["name"], "Riverside Alert Zone");
    assert_eq!(body["zone"]["category"], "hazard_medium");
    // No geocoder configured: address stays unresolved.
    assert!(body["zone"]["address"].is_null());

    let fetched: Value = server.get(&format!("/api/v1/zones/{}", id)).await.json();
    assert_eq!(fetched["zone"]["name"], "Riverside Alert Zone");
}

#[tokio::test]
async fn create_zone_with_invalid_radius_is_rejected() {
    let server = server();

    let response = server
        .post("/api/v1/zones")
        .json(&json!({
            "name": "Bad Zone",
            "category": "safe",
            "latitude": 37.7600,
            "longitude": -122.3900,
            "radius_km": -1.0
        }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["type"], "/problems/invalid-request");
    assert!(body["detail"].as_str().unwrap().contains("'radius_km'"));
}

#[tokio::test]
async fn create_zone_with_unknown_category_is_rejected_at_deserialization() {
    let server = server();

    let response = server
        .post("/api/v1/zones")
        .json(&json!({
            "name": "Bad Zone",
            "category": "red",
            "latitude": 37.7600,
            "longitude": -122.3900,
            "radius_km": 1.0
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_zone_changes_fields() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/zones/{}", id))
        .json(&json!({"radius_km": 2.5}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["zone"]["radius_km"], 2.5);
    assert_eq!(body["zone"]["name"], fixture_zones::DOWNTOWN);
}

#[tokio::test]
async fn update_zone_can_move_the_center() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/zones/{}", id))
        .json(&json!({"latitude": 37.7800, "longitude": -122.4100}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["zone"]["latitude"], 37.78);
    assert_eq!(body["zone"]["longitude"], -122.41);
}

#[tokio::test]
async fn update_with_empty_body_is_a_no_op() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();
    let original_radius = list["zones"][0]["radius_km"].as_f64().unwrap();

    let response = server
        .put(&format!("/api/v1/zones/{}", id))
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["zone"]["radius_km"].as_f64().unwrap(), original_radius);
}

#[tokio::test]
async fn update_unknown_zone_is_not_found() {
    let server = server();

    let response = server
        .put("/api/v1/zones/9999")
        .json(&json!({"radius_km": 2.0}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn update_with_invalid_longitude_is_rejected() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/zones/{}", id))
        .json(&json!({"longitude": -200.0}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn delete_zone_removes_it() {
    let server = server();

    let list: Value = server.get("/api/v1/zones").await.json();
    let id = list["zones"][0]["id"].as_i64().unwrap();

    let response = server.delete(&format!("/api/v1/zones/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["deleted"], id);

    server
        .get(&format!("/api/v1/zones/{}", id))
        .await
        .assert_status_not_found();

    server
        .delete(&format!("/api/v1/zones/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn health_probes_respond() {
    let server = server();

    let live = server.get("/health/live").await;
    live.assert_status_ok();
    let body: Value = live.json();
    assert_eq!(body["status"], "ok");

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["zones_loaded"], 6);
}
