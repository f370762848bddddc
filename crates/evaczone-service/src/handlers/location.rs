//! The location-check orchestration endpoint.
//!
//! Pipeline for `POST /api/v1/location/check`: validate the request,
//! reverse-geocode the point, resolve containment over the current zone
//! snapshot, and for hazardous matches resolve the nearest safe zone, fetch
//! directions, and dispatch an SMS alert. Every third-party stage degrades on
//! failure: a missing address, route, or alert delivery is logged and the
//! check still completes.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use evaczone_lib::{
    alert_message, format_phone_number, nearest_of_category, resolve_containment, NewLocationReport,
    Point, RoutePlan, Zone, ZoneCategory,
};
use evaczone_service_shared::{
    extract_or_generate_request_id, from_lib_error, AppState, CheckLocationRequest,
    ServiceResponse, Validate,
};

/// Echo of the checked position.
#[derive(Debug, Serialize)]
struct LocationInfo {
    latitude: f64,
    longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

/// Evacuation guidance for hazardous containment.
#[derive(Debug, Serialize)]
struct EvacuationInfo {
    safe_zone: Zone,
    distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    directions: Option<RoutePlan>,
}

/// Response body for a completed location check.
#[derive(Debug, Serialize)]
struct CheckLocationResponse {
    location: LocationInfo,
    contained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evacuation: Option<EvacuationInfo>,
}

/// Handle `POST /api/v1/location/check`.
pub async fn check_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckLocationRequest>,
) -> Response {
    let request_id = extract_or_generate_request_id(&headers);

    info!(
        request_id = %request_id,
        latitude = request.latitude,
        longitude = request.longitude,
        "handling location check"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        return (*problem).into_response();
    }

    let point = Point::new(request.latitude, request.longitude);

    // Resolve the address first; a geocoder failure degrades to None.
    let address = match state.geocoder() {
        Some(geocoder) => match geocoder.reverse_geocode(point).await {
            Ok(address) => address,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "reverse geocoding failed, continuing without address");
                None
            }
        },
        None => None,
    };

    // One consistent snapshot of the zone set for the whole check.
    let zones = match state.store().list_zones() {
        Ok(zones) => zones,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "failed to load zones");
            return from_lib_error(&e, request_id.as_str()).into_response();
        }
    };

    let matched = resolve_containment(point, &zones).cloned();
    let contained = matched.is_some();

    let mut evacuation = None;
    if let Some(zone) = &matched {
        if zone.category.is_hazardous() {
            let nearest = nearest_of_category(point, &zones, ZoneCategory::Safe);
            if nearest.is_none() {
                warn!(request_id = %request_id, "no safe zone available for evacuation");
            }

            let directions = match (&nearest, state.directions()) {
                (Some(nearest), Some(client)) => {
                    match client.route(point, nearest.zone.center()).await {
                        Ok(plan) => plan,
                        Err(e) => {
                            warn!(request_id = %request_id, error = %e, "directions lookup failed, alerting without a route");
                            None
                        }
                    }
                }
                _ => None,
            };

            if let Some(notifier) = state.notifier() {
                let body = alert_message(zone.category, address.as_deref(), directions.as_ref());
                let to = format_phone_number(&request.phone_number);
                match notifier.send_alert(&to, &body).await {
                    Ok(sid) => info!(request_id = %request_id, sid = %sid, "evacuation alert dispatched"),
                    Err(e) => {
                        warn!(request_id = %request_id, error = %e, "evacuation alert delivery failed")
                    }
                }
            }

            evacuation = nearest.map(|nearest| EvacuationInfo {
                safe_zone: nearest.zone.clone(),
                distance_km: nearest.distance_km,
                directions,
            });
        } else {
            info!(request_id = %request_id, zone = %zone.name, "position in safe zone, no evacuation needed");
        }
    }

    let in_danger_zone = matched
        .as_ref()
        .is_some_and(|zone| zone.category.is_hazardous());

    // Report persistence must not block the alert response.
    let report = NewLocationReport {
        phone_number: request.phone_number.clone(),
        latitude: request.latitude,
        longitude: request.longitude,
        address: address.clone(),
        in_danger_zone,
        zone_id: matched.as_ref().map(|zone| zone.id),
    };
    if let Err(e) = state.store().insert_report(&report) {
        warn!(request_id = %request_id, error = %e, "failed to persist location report");
    }

    info!(
        request_id = %request_id,
        contained,
        in_danger_zone,
        zone = matched.as_ref().map(|zone| zone.name.as_str()).unwrap_or("-"),
        "location check completed"
    );

    ServiceResponse::new(CheckLocationResponse {
        location: LocationInfo {
            latitude: request.latitude,
            longitude: request.longitude,
            address,
        },
        contained,
        zone: matched,
        evacuation,
    })
    .into_response()
}
