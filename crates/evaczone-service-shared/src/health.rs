//! Health check handlers for liveness/readiness probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Number of zones in the store (for readiness check).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones_loaded: Option<usize>,
}

impl HealthStatus {
    /// Create a healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: None,
        }
    }

    /// Create a ready status with the zone count.
    pub fn ready(service: &str, version: &str, zones: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: Some(zones),
        }
    }

    /// Create a not-ready status.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            zones_loaded: None,
        }
    }
}

/// Liveness probe handler.
///
/// Returns 200 OK if the process is running; depends on nothing external.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Returns 200 OK when the zone store answers queries; 503 otherwise. An
/// empty zone set is still ready: an operator may simply not have seeded
/// zones yet.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match state.store().zone_count() {
        Ok(zones) => {
            let status = HealthStatus::ready(service, version, zones);
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => {
            let status = HealthStatus::not_ready(service, version, &e.to_string());
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("evaczone-service", "0.1.0");
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "evaczone-service");
        assert!(status.zones_loaded.is_none());
    }

    #[test]
    fn test_health_status_ready() {
        let status = HealthStatus::ready("evaczone-service", "0.1.0", 6);
        assert_eq!(status.status, "ok");
        assert_eq!(status.zones_loaded, Some(6));
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("evaczone-service", "0.1.0", "store unreachable");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("store unreachable"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::alive("evaczone-service", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("zones_loaded")); // skip_serializing_if
    }
}
