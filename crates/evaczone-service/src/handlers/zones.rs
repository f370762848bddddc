//! Zone CRUD handlers.
//!
//! Creation and coordinate-moving updates resolve the zone's address through
//! the geocoder when one is configured; a geocoder failure degrades to a
//! missing address and never blocks the mutation.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use evaczone_lib::{Zone, ZoneId};
use evaczone_service_shared::{
    extract_or_generate_request_id, from_lib_error, AppState, CreateZoneRequest, RequestId,
    ServiceResponse, UpdateZoneRequest, Validate, ZoneListQuery,
};

#[derive(Debug, Serialize)]
struct ZoneListResponse {
    zones: Vec<Zone>,
}

#[derive(Debug, Serialize)]
struct ZoneResponse {
    zone: Zone,
}

#[derive(Debug, Serialize)]
struct DeleteZoneResponse {
    deleted: ZoneId,
}

/// Handle `GET /api/v1/zones`.
pub async fn list_zones(
    State(state): State<AppState>,
    Query(query): Query<ZoneListQuery>,
    headers: HeaderMap,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    let result = match query.category {
        Some(category) => state.store().list_zones_by_category(category),
        None => state.store().list_zones(),
    };

    match result {
        Ok(zones) => ServiceResponse::new(ZoneListResponse { zones }).into_response(),
        Err(e) => from_lib_error(&e, request_id.as_str()).into_response(),
    }
}

/// Handle `GET /api/v1/zones/{id}`.
pub async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<ZoneId>,
    headers: HeaderMap,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    match state.store().get_zone(id) {
        Ok(zone) => ServiceResponse::new(ZoneResponse { zone }).into_response(),
        Err(e) => from_lib_error(&e, request_id.as_str()).into_response(),
    }
}

/// Handle `POST /api/v1/zones`.
pub async fn create_zone(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateZoneRequest>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    if let Err(problem) = request.validate(request_id.as_str()) {
        return (*problem).into_response();
    }

    let mut new_zone = request.into_new_zone();
    new_zone.address = resolve_address(
        &state,
        new_zone.latitude,
        new_zone.longitude,
        &request_id,
    )
    .await;

    match state.store().create_zone(&new_zone) {
        Ok(zone) => {
            info!(request_id = %request_id, id = zone.id, name = %zone.name, "zone created");
            (
                StatusCode::CREATED,
                ServiceResponse::new(ZoneResponse { zone }),
            )
                .into_response()
        }
        Err(e) => from_lib_error(&e, request_id.as_str()).into_response(),
    }
}

/// Handle `PUT /api/v1/zones/{id}`.
pub async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<ZoneId>,
    headers: HeaderMap,
    Json(request): Json<UpdateZoneRequest>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    if let Err(problem) = request.validate(request_id.as_str()) {
        return (*problem).into_response();
    }

    let (mut zone, moved) = match state.store().update_zone(id, &request.into_zone_update()) {
        Ok(result) => result,
        Err(e) => return from_lib_error(&e, request_id.as_str()).into_response(),
    };

    // A moved center invalidates the stored address; resolve it again.
    if moved {
        let address = resolve_address(&state, zone.latitude, zone.longitude, &request_id).await;
        match state.store().set_zone_address(id, address.as_deref()) {
            Ok(updated) => zone = updated,
            Err(e) => {
                warn!(request_id = %request_id, id, error = %e, "failed to store re-resolved address")
            }
        }
    }

    info!(request_id = %request_id, id, moved_center = moved, "zone updated");
    ServiceResponse::new(ZoneResponse { zone }).into_response()
}

/// Handle `DELETE /api/v1/zones/{id}`.
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<ZoneId>,
    headers: HeaderMap,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    match state.store().delete_zone(id) {
        Ok(()) => {
            info!(request_id = %request_id, id, "zone deleted");
            ServiceResponse::new(DeleteZoneResponse { deleted: id }).into_response()
        }
        Err(e) => from_lib_error(&e, request_id.as_str()).into_response(),
    }
}

/// Reverse-geocode a zone center, degrading to `None` on any failure.
async fn resolve_address(
    state: &AppState,
    latitude: f64,
    longitude: f64,
    request_id: &RequestId,
) -> Option<String> {
    let geocoder = state.geocoder()?;
    match geocoder
        .reverse_geocode(evaczone_lib::Point::new(latitude, longitude))
        .await
    {
        Ok(address) => address,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "zone address resolution failed");
            None
        }
    }
}
