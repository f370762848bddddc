//! SMS alert delivery through the Twilio Messages API.
//!
//! Message bodies are produced by [`alert_message`], a pure formatter that
//! varies by zone category: hazardous categories produce urgent evacuation
//! guidance, the safe category a reassurance notice. Delivery failures are
//! surfaced as errors; the orchestration layer logs them and continues.

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::directions::RoutePlan;
use crate::error::Result;
use crate::zone::ZoneCategory;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Cap on route steps included in an evacuation message; enough for
/// immediate guidance without overflowing an SMS.
const MAX_MESSAGE_STEPS: usize = 3;

/// Client for outbound SMS delivery.
#[derive(Debug, Clone)]
pub struct SmsClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl SmsClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self::with_base_url(TWILIO_API_BASE, account_sid, auth_token, from_number)
    }

    /// Override the API base URL. Tests point this at a local server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        }
    }

    /// Send `body` to `to`, returning the provider's message id.
    pub async fn send_alert(&self, to: &str, body: &str) -> Result<String> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?
            .error_for_status()?;

        let message: MessageResponse = response.json().await?;
        info!(to = %to, sid = %message.sid, "sms dispatched");
        Ok(message.sid)
    }
}

/// Compose the alert body for a containment result.
///
/// High hazard: emergency text with the evacuation route summary and up to
/// three immediate steps. Medium hazard: warning text. Safe: reassurance
/// text. The route is only used for the high-hazard template.
pub fn alert_message(
    category: ZoneCategory,
    address: Option<&str>,
    route: Option<&RoutePlan>,
) -> String {
    let address = address.unwrap_or("your reported location");

    match category {
        ZoneCategory::HazardHigh => {
            let mut body = format!(
                "EMERGENCY ALERT\n\nYou are currently in a HIGH DANGER zone at: {}. \
                 IMMEDIATE EVACUATION is required!",
                address
            );

            if let Some(route) = route {
                body.push_str(&format!(
                    "\n\nEvacuation route ({}, {}):\n- Head to: {}",
                    route.distance_text, route.duration_text, route.end_address
                ));

                if !route.steps.is_empty() {
                    body.push_str("\n\nImmediate steps:");
                    for (index, step) in route.steps.iter().take(MAX_MESSAGE_STEPS).enumerate() {
                        body.push_str(&format!(
                            "\n{}. {} ({})",
                            index + 1,
                            step.instruction,
                            step.distance_text
                        ));
                    }
                }
            }

            body.push_str("\n\nStay calm and follow official evacuation routes.");
            body
        }
        ZoneCategory::HazardMedium => format!(
            "WARNING ALERT\n\nYou are in a MEDIUM DANGER zone at: {}. Prepare for \
             possible evacuation and stay alert for further instructions.",
            address
        ),
        ZoneCategory::Safe => format!(
            "SAFETY NOTIFICATION\n\nYou are currently in a SAFE zone at: {}. No \
             evacuation is necessary at this time.",
            address
        ),
    }
}

/// Normalize a phone number to E.164 for the SMS provider.
///
/// Ten digits are taken as a US number and prefixed with `+1`; longer inputs
/// are assumed to already carry a country code.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 {
        format!("+1{}", digits)
    } else {
        format!("+{}", digits)
    }
}
