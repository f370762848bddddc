//! Reverse geocoding through the Google Maps Geocoding API.
//!
//! The client resolves a coordinate pair to a formatted street address.
//! `Ok(None)` means the API had no address for the point; that is a normal
//! outcome, and callers are expected to degrade to a missing address rather
//! than abort whatever they were doing.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Point;

const GEOCODE_API_BASE: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Client for coordinate-to-address resolution.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

impl GeocoderClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(GEOCODE_API_BASE, api_key)
    }

    /// Override the API base URL. Tests point this at a local server.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve the formatted address nearest to `point`, if any.
    pub async fn reverse_geocode(&self, point: Point) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                (
                    "latlng",
                    format!("{},{}", point.latitude, point.longitude),
                ),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;
        let address = extract_address(body)?;
        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            found = address.is_some(),
            "reverse geocode completed"
        );
        Ok(address)
    }
}

/// Pull the first formatted address out of a geocoding response.
///
/// `ZERO_RESULTS` is a normal empty outcome; any other non-OK status is a
/// malformed exchange with the API.
fn extract_address(response: GeocodeResponse) -> Result<Option<String>> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .next()
            .map(|result| result.formatted_address)),
        "ZERO_RESULTS" => Ok(None),
        other => Err(Error::UnexpectedResponse {
            service: "geocoder".to_string(),
            message: format!("status {}", other),
        }),
    }
}
