//! Zone and location-report data model.
//!
//! All invariants on zone data (radius strictly positive, coordinates finite
//! and in range, category within the closed enumeration, non-empty name) are
//! enforced here, at construction and update time. The resolver math in
//! [`crate::resolver`] assumes values that already passed this gate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Point;

/// Numeric identifier for a zone, assigned by the store.
pub type ZoneId = i64;

/// Danger/safety classification of a zone.
///
/// Ordering is by danger priority: when overlapping zones contain the same
/// point, the more dangerous classification wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    HazardHigh,
    HazardMedium,
    Safe,
}

impl ZoneCategory {
    /// All categories in priority order.
    pub const ALL: [ZoneCategory; 3] = [
        ZoneCategory::HazardHigh,
        ZoneCategory::HazardMedium,
        ZoneCategory::Safe,
    ];

    /// Sort key for priority resolution; lower values are more dangerous.
    pub fn priority(self) -> u8 {
        match self {
            ZoneCategory::HazardHigh => 0,
            ZoneCategory::HazardMedium => 1,
            ZoneCategory::Safe => 2,
        }
    }

    /// True for categories that trigger the evacuation pipeline.
    pub fn is_hazardous(self) -> bool {
        !matches!(self, ZoneCategory::Safe)
    }

    /// Stable wire/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneCategory::HazardHigh => "hazard_high",
            ZoneCategory::HazardMedium => "hazard_medium",
            ZoneCategory::Safe => "safe",
        }
    }
}

impl fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneCategory {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        match label {
            "hazard_high" => Ok(ZoneCategory::HazardHigh),
            "hazard_medium" => Ok(ZoneCategory::HazardMedium),
            "safe" => Ok(ZoneCategory::Safe),
            other => Err(Error::UnknownCategory {
                label: other.to_string(),
            }),
        }
    }
}

/// A circular geographic region with a danger/safety category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub category: ZoneCategory,
    /// Center latitude in decimal degrees.
    pub latitude: f64,
    /// Center longitude in decimal degrees.
    pub longitude: f64,
    /// Radius in kilometers, strictly positive.
    pub radius_km: f64,
    /// Human-readable address of the center, resolved by the geocoder.
    pub address: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Zone {
    /// Center of the zone as a [`Point`].
    pub fn center(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }
}

/// Payload for creating a zone. Validated before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewZone {
    pub name: String,
    pub category: ZoneCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewZone {
    /// Check the zone invariants, rejecting the payload before any mutation.
    pub fn validate(&self) -> Result<()> {
        validate_zone_fields(&self.name, self.latitude, self.longitude, self.radius_km)
    }
}

/// Partial update of a zone; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub category: Option<ZoneCategory>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub description: Option<String>,
}

impl ZoneUpdate {
    /// True when the update would move the zone center, which obliges the
    /// caller to re-resolve the address.
    pub fn moves_center(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some()
    }

    /// Check the invariants for every field present in the update.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(latitude) = self.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(longitude) = self.longitude {
            validate_longitude(longitude)?;
        }
        if let Some(radius_km) = self.radius_km {
            validate_radius(radius_km)?;
        }
        Ok(())
    }
}

/// A recorded position report from a phone user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub id: i64,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub in_danger_zone: bool,
    pub zone_id: Option<ZoneId>,
    pub created_at: DateTime<Utc>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_zone("name must not be empty"));
    }
    Ok(())
}

fn validate_latitude(latitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::invalid_zone(format!(
            "latitude {} outside -90..=90",
            latitude
        )));
    }
    Ok(())
}

fn validate_longitude(longitude: f64) -> Result<()> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::invalid_zone(format!(
            "longitude {} outside -180..=180",
            longitude
        )));
    }
    Ok(())
}

fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(Error::invalid_zone(format!(
            "radius {} must be strictly positive",
            radius_km
        )));
    }
    Ok(())
}

fn validate_zone_fields(name: &str, latitude: f64, longitude: f64, radius_km: f64) -> Result<()> {
    validate_name(name)?;
    validate_latitude(latitude)?;
    validate_longitude(longitude)?;
    validate_radius(radius_km)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_new_zone() -> NewZone {
        NewZone {
            name: "Downtown Danger Zone".to_string(),
            category: ZoneCategory::HazardHigh,
            latitude: 37.7749,
            longitude: -122.4194,
            radius_km: 1.0,
            address: None,
            description: None,
        }
    }

    #[test]
    fn valid_zone_passes_validation() {
        assert!(valid_new_zone().validate().is_ok());
    }

    #[test]
    fn zero_radius_is_rejected() {
        let mut zone = valid_new_zone();
        zone.radius_km = 0.0;
        assert!(matches!(
            zone.validate(),
            Err(Error::InvalidZone { .. })
        ));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let mut zone = valid_new_zone();
        zone.radius_km = -1.5;
        assert!(zone.validate().is_err());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut zone = valid_new_zone();
        zone.latitude = f64::NAN;
        assert!(zone.validate().is_err());

        let mut zone = valid_new_zone();
        zone.longitude = f64::INFINITY;
        assert!(zone.validate().is_err());
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let mut zone = valid_new_zone();
        zone.latitude = 90.5;
        assert!(zone.validate().is_err());

        let mut zone = valid_new_zone();
        zone.longitude = -180.1;
        assert!(zone.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut zone = valid_new_zone();
        zone.name = "   ".to_string();
        assert!(zone.validate().is_err());
    }

    #[test]
    fn update_validates_only_present_fields() {
        let update = ZoneUpdate {
            radius_km: Some(2.0),
            ..ZoneUpdate::default()
        };
        assert!(update.validate().is_ok());

        let update = ZoneUpdate {
            radius_km: Some(-2.0),
            ..ZoneUpdate::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_reports_center_movement() {
        assert!(!ZoneUpdate::default().moves_center());
        assert!(ZoneUpdate {
            latitude: Some(37.0),
            ..ZoneUpdate::default()
        }
        .moves_center());
        assert!(ZoneUpdate {
            longitude: Some(-122.0),
            ..ZoneUpdate::default()
        }
        .moves_center());
    }

    #[test]
    fn category_priority_ranks_danger_first() {
        assert!(ZoneCategory::HazardHigh.priority() < ZoneCategory::HazardMedium.priority());
        assert!(ZoneCategory::HazardMedium.priority() < ZoneCategory::Safe.priority());
    }

    #[test]
    fn category_labels_round_trip() {
        for category in ZoneCategory::ALL {
            assert_eq!(category.as_str().parse::<ZoneCategory>().unwrap(), category);
        }
        assert!(matches!(
            "red".parse::<ZoneCategory>(),
            Err(Error::UnknownCategory { .. })
        ));
    }

    #[test]
    fn category_serde_uses_snake_case() {
        let json = serde_json::to_string(&ZoneCategory::HazardHigh).unwrap();
        assert_eq!(json, "\"hazard_high\"");
        let parsed: ZoneCategory = serde_json::from_str("\"safe\"").unwrap();
        assert_eq!(parsed, ZoneCategory::Safe);
    }
}
