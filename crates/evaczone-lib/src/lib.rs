//! Evaczone library entry points.
//!
//! This crate exposes the zone data model, the great-circle geometry and
//! containment/nearest-zone resolver, the SQLite zone store, and the outbound
//! collaborator clients (geocoding, directions, SMS). Higher-level consumers
//! (the HTTP service, the CLI) should only depend on the functions exported
//! here instead of reimplementing behavior.

#![deny(warnings)]

pub mod directions;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod notify;
pub mod resolver;
pub mod store;
pub mod zone;

pub use directions::{DirectionsClient, RoutePlan, RouteStep};
pub use error::{Error, Result};
pub use geo::{haversine_km, Point};
pub use geocode::GeocoderClient;
pub use notify::{alert_message, format_phone_number, SmsClient};
pub use resolver::{nearest_of_category, resolve_containment, zone_contains, NearestZone};
pub use store::{NewLocationReport, ZoneStore};
pub use zone::{LocationReport, NewZone, Zone, ZoneCategory, ZoneId, ZoneUpdate};
