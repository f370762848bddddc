//! Test utilities for service handler testing.
//!
//! Provides an in-memory application state pre-seeded with a small San
//! Francisco zone set, so handler tests need no database file and no network.

use evaczone_lib::{NewZone, Zone, ZoneCategory, ZoneStore};

use crate::state::AppState;

/// Seed the fixture zones into a store, returning them in insertion order.
///
/// Two high-hazard zones, two medium-hazard zones, and two safe zones around
/// San Francisco. Addresses are left unresolved: tests run offline.
pub fn seed_zones(store: &ZoneStore) -> Vec<Zone> {
    let fixtures = [
        (
            fixture_zones::DOWNTOWN,
            ZoneCategory::HazardHigh,
            37.7749,
            -122.4194,
            1.0,
            "High risk area due to potential flooding and structural hazards.",
        ),
        (
            fixture_zones::INDUSTRIAL,
            ZoneCategory::HazardHigh,
            37.7833,
            -122.4167,
            0.8,
            "Chemical hazards and industrial risks present.",
        ),
        (
            fixture_zones::COASTAL,
            ZoneCategory::HazardMedium,
            37.8083,
            -122.4156,
            1.2,
            "Moderate risk of coastal flooding and storm surge.",
        ),
        (
            fixture_zones::HILL_DISTRICT,
            ZoneCategory::HazardMedium,
            37.7516,
            -122.4477,
            0.9,
            "Landslide risk during heavy rain periods.",
        ),
        (
            fixture_zones::CENTRAL_PARK,
            ZoneCategory::Safe,
            37.7694,
            -122.4862,
            1.5,
            "Designated evacuation area with emergency supplies and shelter.",
        ),
        (
            fixture_zones::HIGHLAND,
            ZoneCategory::Safe,
            37.7928,
            -122.4551,
            1.2,
            "Elevated area safe from flooding with medical facilities.",
        ),
    ];

    fixtures
        .into_iter()
        .map(|(name, category, latitude, longitude, radius_km, description)| {
            store
                .create_zone(&NewZone {
                    name: name.to_string(),
                    category,
                    latitude,
                    longitude,
                    radius_km,
                    address: None,
                    description: Some(description.to_string()),
                })
                .unwrap_or_else(|e| panic!("failed to seed fixture zone '{}': {}", name, e))
        })
        .collect()
}

/// Fresh application state over a seeded in-memory store, with no outbound
/// clients configured.
///
/// Each call returns an independent store, so tests can mutate zones without
/// interfering with each other.
pub fn test_state() -> AppState {
    let store = ZoneStore::open_in_memory().expect("open in-memory store");
    seed_zones(&store);
    AppState::from_components(store, None, None, None)
}

/// Application state over an empty in-memory store.
pub fn empty_state() -> AppState {
    let store = ZoneStore::open_in_memory().expect("open in-memory store");
    AppState::from_components(store, None, None, None)
}

/// Known fixture zone names for use in tests.
pub mod fixture_zones {
    pub const DOWNTOWN: &str = "Downtown Danger Zone";
    pub const INDUSTRIAL: &str = "Industrial Hazard Zone";
    pub const COASTAL: &str = "Coastal Warning Zone";
    pub const HILL_DISTRICT: &str = "Hill District Alert Zone";
    pub const CENTRAL_PARK: &str = "Central Park Safe Zone";
    pub const HIGHLAND: &str = "Highland Safe Zone";
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    format!("test-{}", timestamp)
}
