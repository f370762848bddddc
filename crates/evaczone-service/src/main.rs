//! evaczone HTTP service binary.
//!
//! # Configuration
//!
//! - `EVACZONE_DB_PATH` - Path to the SQLite zone database (default: evaczone.db)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `GEOCODER_API_KEY` - Google Maps API key (optional)
//! - `TWILIO_ACCOUNT_SID` / `TWILIO_AUTH_TOKEN` / `TWILIO_FROM_NUMBER` -
//!   SMS credentials (optional)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::net::SocketAddr;

use tracing::{error, info, warn};

use evaczone_lib::{DirectionsClient, GeocoderClient, SmsClient, ZoneStore};
use evaczone_service::{app, config::ServiceConfig};
use evaczone_service_shared::{init_logging, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("evaczone");
    init_logging(&logging_config);

    let config = ServiceConfig::from_env();
    info!(db_path = %config.db_path, port = config.port, "starting evaczone service");

    let store = ZoneStore::open(&config.db_path).map_err(|e| {
        error!(error = %e, path = %config.db_path, "failed to open zone store");
        e
    })?;

    let geocoder = config.geocoder_api_key.clone().map(GeocoderClient::new);
    let directions = config.geocoder_api_key.clone().map(DirectionsClient::new);
    if geocoder.is_none() {
        warn!("GEOCODER_API_KEY not set; addresses and directions will be unavailable");
    }

    let notifier = if config.sms_configured() {
        Some(SmsClient::new(
            config.twilio_account_sid.clone().unwrap_or_default(),
            config.twilio_auth_token.clone().unwrap_or_default(),
            config.twilio_from_number.clone().unwrap_or_default(),
        ))
    } else {
        warn!("Twilio credentials not fully configured; SMS alerts disabled");
        None
    };

    let state = AppState::from_components(store, geocoder, directions, notifier);
    info!(state = ?state, "application state assembled");

    let router = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
