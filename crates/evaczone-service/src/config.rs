//! Service configuration from environment variables.
//!
//! Missing third-party credentials put the service in degraded mode (the
//! corresponding pipeline stage is skipped); they never prevent startup.

use std::env;

/// Runtime configuration for the service binary.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the SQLite zone database.
    pub db_path: String,
    /// HTTP port to bind.
    pub port: u16,
    /// Google Maps API key for geocoding and directions.
    pub geocoder_api_key: Option<String>,
    /// Twilio account SID for SMS delivery.
    pub twilio_account_sid: Option<String>,
    /// Twilio auth token for SMS delivery.
    pub twilio_auth_token: Option<String>,
    /// Twilio sender number for SMS delivery.
    pub twilio_from_number: Option<String>,
}

impl ServiceConfig {
    /// Read configuration from the environment.
    ///
    /// - `EVACZONE_DB_PATH` - zone database path (default: `evaczone.db`)
    /// - `SERVICE_PORT` - HTTP port (default: 8080)
    /// - `GEOCODER_API_KEY` - Google Maps API key (optional)
    /// - `TWILIO_ACCOUNT_SID` / `TWILIO_AUTH_TOKEN` / `TWILIO_FROM_NUMBER` -
    ///   SMS credentials (optional; all three required to enable alerts)
    pub fn from_env() -> Self {
        let db_path = env::var("EVACZONE_DB_PATH").unwrap_or_else(|_| "evaczone.db".to_string());
        let port: u16 = env::var("SERVICE_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);

        Self {
            db_path,
            port,
            geocoder_api_key: non_empty_var("GEOCODER_API_KEY"),
            twilio_account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
            twilio_from_number: non_empty_var("TWILIO_FROM_NUMBER"),
        }
    }

    /// True when all Twilio credentials are present.
    pub fn sms_configured(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
