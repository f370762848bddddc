//! Great-circle geometry over latitude/longitude pairs.
//!
//! The distance computation is the classic haversine formula on a spherical
//! Earth. It performs no range validation: callers that need validated
//! coordinates get them from the zone data model, which rejects out-of-range
//! values before they ever reach this module.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Ephemeral value type: points carry no identity and are passed by value
/// into every resolver operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance between two points in kilometers.
///
/// Haversine formula:
///
/// ```text
/// a = sin²(dlat/2) + cos(lat1)·cos(lat2)·sin²(dlon/2)
/// c = 2·asin(√a)
/// d = c × 6371
/// ```
///
/// Symmetric in its arguments and zero for identical points.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    c * EARTH_RADIUS_KM
}
