//! Request types and validation for HTTP endpoints.
//!
//! Validation mirrors the zone invariants enforced by `evaczone-lib`, so a
//! request that passes here cannot fail validation again at the store.

use serde::{Deserialize, Serialize};

use evaczone_lib::{NewZone, ZoneCategory, ZoneUpdate};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for checking a reported position against the zone set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckLocationRequest {
    /// Phone number of the reporting user.
    pub phone_number: String,

    /// Reported latitude in decimal degrees.
    pub latitude: f64,

    /// Reported longitude in decimal degrees.
    pub longitude: f64,
}

impl Validate for CheckLocationRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.phone_number.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'phone_number' field is required and cannot be empty",
                request_id,
            )));
        }

        validate_latitude(self.latitude, request_id)?;
        validate_longitude(self.longitude, request_id)?;

        Ok(())
    }
}

/// Request for creating a zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZoneRequest {
    /// Display name of the zone.
    pub name: String,

    /// Danger/safety category.
    pub category: ZoneCategory,

    /// Center latitude in decimal degrees.
    pub latitude: f64,

    /// Center longitude in decimal degrees.
    pub longitude: f64,

    /// Radius in kilometers.
    pub radius_km: f64,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateZoneRequest {
    /// Convert into the library's creation payload. The address starts empty;
    /// the handler resolves it through the geocoder after validation.
    pub fn into_new_zone(self) -> NewZone {
        NewZone {
            name: self.name,
            category: self.category,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_km: self.radius_km,
            address: None,
            description: self.description,
        }
    }
}

impl Validate for CreateZoneRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.name.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'name' field is required and cannot be empty",
                request_id,
            )));
        }

        validate_latitude(self.latitude, request_id)?;
        validate_longitude(self.longitude, request_id)?;
        validate_radius(self.radius_km, request_id)?;

        Ok(())
    }
}

/// Request for partially updating a zone; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateZoneRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ZoneCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateZoneRequest {
    /// Convert into the library's update payload.
    pub fn into_zone_update(self) -> ZoneUpdate {
        ZoneUpdate {
            name: self.name,
            category: self.category,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_km: self.radius_km,
            description: self.description,
        }
    }
}

impl Validate for UpdateZoneRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Box::new(ProblemDetails::bad_request(
                    "The 'name' field cannot be empty",
                    request_id,
                )));
            }
        }

        if let Some(latitude) = self.latitude {
            validate_latitude(latitude, request_id)?;
        }
        if let Some(longitude) = self.longitude {
            validate_longitude(longitude, request_id)?;
        }
        if let Some(radius_km) = self.radius_km {
            validate_radius(radius_km, request_id)?;
        }

        Ok(())
    }
}

/// Query parameters for listing zones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneListQuery {
    /// Restrict the listing to one category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ZoneCategory>,
}

fn validate_latitude(latitude: f64, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(Box::new(ProblemDetails::bad_request(
            "The 'latitude' field must be a finite number between -90 and 90",
            request_id,
        )));
    }
    Ok(())
}

fn validate_longitude(longitude: f64, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(Box::new(ProblemDetails::bad_request(
            "The 'longitude' field must be a finite number between -180 and 180",
            request_id,
        )));
    }
    Ok(())
}

fn validate_radius(radius_km: f64, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(Box::new(ProblemDetails::bad_request(
            "The 'radius_km' field must be a positive number",
            request_id,
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_location_request_valid() {
        let req = CheckLocationRequest {
            phone_number: "+14155550100".to_string(),
            latitude: 37.7750,
            longitude: -122.4195,
        };
        assert!(req.validate("test").is_ok());
    }

    #[test]
    fn test_check_location_request_empty_phone() {
        let req = CheckLocationRequest {
            phone_number: "  ".to_string(),
            latitude: 37.7750,
            longitude: -122.4195,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'phone_number'"));
    }

    #[test]
    fn test_check_location_request_latitude_out_of_range() {
        let req = CheckLocationRequest {
            phone_number: "+14155550100".to_string(),
            latitude: 91.0,
            longitude: 0.0,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'latitude'"));
    }

    #[test]
    fn test_check_location_request_non_finite_longitude() {
        let req = CheckLocationRequest {
            phone_number: "+14155550100".to_string(),
            latitude: 0.0,
            longitude: f64::NAN,
        };
        assert!(req.validate("test").is_err());
    }

    #[test]
    fn test_create_zone_request_valid() {
        let req = CreateZoneRequest {
            name: "Downtown Danger Zone".to_string(),
            category: ZoneCategory::HazardHigh,
            latitude: 37.7749,
            longitude: -122.4194,
            radius_km: 1.0,
            description: None,
        };
        assert!(req.validate("test").is_ok());
    }

    #[test]
    fn test_create_zone_request_empty_name() {
        let req = CreateZoneRequest {
            name: "".to_string(),
            category: ZoneCategory::Safe,
            latitude: 37.7749,
            longitude: -122.4194,
            radius_km: 1.0,
            description: None,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'name'"));
    }

    #[test]
    fn test_create_zone_request_zero_radius() {
        let req = CreateZoneRequest {
            name: "Zone".to_string(),
            category: ZoneCategory::Safe,
            latitude: 37.7749,
            longitude: -122.4194,
            radius_km: 0.0,
            description: None,
        };
        let err = req.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'radius_km'"));
    }

    #[test]
    fn test_create_zone_request_unknown_category_rejected_by_serde() {
        let json = r#"{"name":"Z","category":"red","latitude":0,"longitude":0,"radius_km":1}"#;
        assert!(serde_json::from_str::<CreateZoneRequest>(json).is_err());
    }

    #[test]
    fn test_update_zone_request_validates_present_fields_only() {
        let req = UpdateZoneRequest {
            radius_km: Some(2.0),
            ..UpdateZoneRequest::default()
        };
        assert!(req.validate("test").is_ok());

        let req = UpdateZoneRequest {
            longitude: Some(-190.0),
            ..UpdateZoneRequest::default()
        };
        assert!(req.validate("test").is_err());
    }

    #[test]
    fn test_update_zone_request_empty_body_is_valid() {
        assert!(UpdateZoneRequest::default().validate("test").is_ok());
    }

    #[test]
    fn test_into_new_zone_starts_without_address() {
        let req = CreateZoneRequest {
            name: "Zone".to_string(),
            category: ZoneCategory::Safe,
            latitude: 37.7694,
            longitude: -122.4862,
            radius_km: 1.5,
            description: Some("evacuation area".to_string()),
        };
        let new_zone = req.into_new_zone();
        assert!(new_zone.address.is_none());
        assert_eq!(new_zone.description.as_deref(), Some("evacuation area"));
    }

    #[test]
    fn test_zone_list_query_deserializes_category() {
        let query: ZoneListQuery = serde_json::from_str(r#"{"category":"safe"}"#).unwrap();
        assert_eq!(query.category, Some(ZoneCategory::Safe));

        let query: ZoneListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.category.is_none());
    }
}
