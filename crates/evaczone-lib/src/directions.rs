//! Driving directions through the Google Directions API.
//!
//! Invoked by the orchestration layer only after containment resolution has
//! identified a hazardous match and a safe evacuation target. `Ok(None)`
//! means the API could not route between the points; the alert is then sent
//! without turn-by-turn guidance.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::Point;

const DIRECTIONS_API_BASE: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// A drivable route to an evacuation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub distance_text: String,
    pub duration_text: String,
    pub start_address: String,
    pub end_address: String,
    /// Ordered turn-by-turn instructions, already stripped of HTML markup.
    pub steps: Vec<RouteStep>,
}

/// One instruction of a [`RoutePlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_text: String,
    pub duration_text: String,
}

/// Client for route retrieval.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: ApiText,
    duration: ApiText,
    start_address: String,
    end_address: String,
    steps: Vec<ApiStep>,
}

#[derive(Debug, Deserialize)]
struct ApiStep {
    html_instructions: String,
    distance: ApiText,
    duration: ApiText,
}

#[derive(Debug, Deserialize)]
struct ApiText {
    text: String,
}

impl DirectionsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DIRECTIONS_API_BASE, api_key)
    }

    /// Override the API base URL. Tests point this at a local server.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch a driving route from `origin` to `destination`.
    pub async fn route(&self, origin: Point, destination: Point) -> Result<Option<RoutePlan>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                (
                    "origin",
                    format!("{},{}", origin.latitude, origin.longitude),
                ),
                (
                    "destination",
                    format!("{},{}", destination.latitude, destination.longitude),
                ),
                ("mode", "driving".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: DirectionsResponse = response.json().await?;
        let plan = extract_route(body)?;
        debug!(found = plan.is_some(), "directions lookup completed");
        Ok(plan)
    }
}

/// Reduce a directions response to the first route's first leg.
fn extract_route(response: DirectionsResponse) -> Result<Option<RoutePlan>> {
    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Ok(None),
        other => {
            return Err(Error::UnexpectedResponse {
                service: "directions".to_string(),
                message: format!("status {}", other),
            })
        }
    }

    let Some(leg) = response
        .routes
        .into_iter()
        .next()
        .and_then(|route| route.legs.into_iter().next())
    else {
        return Ok(None);
    };

    Ok(Some(RoutePlan {
        distance_text: leg.distance.text,
        duration_text: leg.duration.text,
        start_address: leg.start_address,
        end_address: leg.end_address,
        steps: leg
            .steps
            .into_iter()
            .map(|step| RouteStep {
                instruction: strip_html_tags(&step.html_instructions),
                distance_text: step.distance.text,
                duration_text: step.duration.text,
            })
            .collect(),
    }))
}

/// Remove HTML markup from an instruction, keeping a line break where the
/// API used a `<div>` separator.
pub fn strip_html_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) => {
                if after[..end].starts_with("div") {
                    output.push('\n');
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated tag; drop the remainder.
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}
