//! evaczone danger-zone alerting HTTP service.
//!
//! Thin axum handlers over `evaczone-lib`: the location-check orchestration
//! endpoint, zone CRUD, and health probes. The router is exposed as
//! [`app`] so integration tests can drive it in-process.
//!
//! # Endpoints
//!
//! - `POST /api/v1/location/check` - Check a reported position, alert if needed
//! - `GET /api/v1/zones` - List zones (optional `?category=` filter)
//! - `POST /api/v1/zones` - Create a zone
//! - `GET /api/v1/zones/{id}` - Fetch a zone
//! - `PUT /api/v1/zones/{id}` - Update a zone
//! - `DELETE /api/v1/zones/{id}` - Delete a zone
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

#![deny(warnings)]

pub mod config;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use evaczone_service_shared::{health_live, health_ready, AppState};

/// Build the service router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/location/check", post(handlers::location::check_location))
        .route(
            "/api/v1/zones",
            get(handlers::zones::list_zones).post(handlers::zones::create_zone),
        )
        .route(
            "/api/v1/zones/{id}",
            get(handlers::zones::get_zone)
                .put(handlers::zones::update_zone)
                .delete(handlers::zones::delete_zone),
        )
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
