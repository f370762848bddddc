//! Application state for the HTTP service.
//!
//! Bundles the zone store with the optional outbound collaborator clients.
//! The store sits behind a mutex because zone CRUD writes through the same
//! connection; store operations are synchronous, so the guard is never held
//! across an await point.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use evaczone_lib::{DirectionsClient, Error as LibError, GeocoderClient, SmsClient, ZoneStore};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to open or migrate the zone database.
    StoreOpen(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreOpen(e) => write!(f, "failed to open zone store: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreOpen(e) => Some(e),
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::StoreOpen(err)
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable (`Arc` internally); share it via axum's `State`
/// extractor. Collaborator clients are optional: when credentials are not
/// configured the service runs in degraded mode and the corresponding
/// pipeline stage is skipped.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Mutex<ZoneStore>,
    geocoder: Option<GeocoderClient>,
    directions: Option<DirectionsClient>,
    notifier: Option<SmsClient>,
}

impl AppState {
    /// Open (creating if necessary) the zone database at `db_path`, with no
    /// outbound clients configured.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();
        tracing::info!(path = %db_path.display(), "opening zone store");
        let store = ZoneStore::open(db_path)?;
        Ok(Self::from_components(store, None, None, None))
    }

    /// Assemble state from pre-built components. Used by binaries after
    /// reading their configuration, and by tests.
    pub fn from_components(
        store: ZoneStore,
        geocoder: Option<GeocoderClient>,
        directions: Option<DirectionsClient>,
        notifier: Option<SmsClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Mutex::new(store),
                geocoder,
                directions,
                notifier,
            }),
        }
    }

    /// Lock and access the zone store.
    ///
    /// Store operations are synchronous; do not hold the guard across an
    /// await point.
    pub fn store(&self) -> MutexGuard<'_, ZoneStore> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn geocoder(&self) -> Option<&GeocoderClient> {
        self.inner.geocoder.as_ref()
    }

    pub fn directions(&self) -> Option<&DirectionsClient> {
        self.inner.directions.as_ref()
    }

    pub fn notifier(&self) -> Option<&SmsClient> {
        self.inner.notifier.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("has_geocoder", &self.inner.geocoder.is_some())
            .field("has_directions", &self.inner.directions.is_some())
            .field("has_notifier", &self.inner.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaczone_lib::{NewZone, ZoneCategory};

    fn state_with_empty_store() -> AppState {
        let store = ZoneStore::open_in_memory().unwrap();
        AppState::from_components(store, None, None, None)
    }

    #[test]
    fn from_components_without_clients_is_degraded() {
        let state = state_with_empty_store();
        assert!(state.geocoder().is_none());
        assert!(state.directions().is_none());
        assert!(state.notifier().is_none());
    }

    #[test]
    fn clones_share_the_same_store() {
        let state1 = state_with_empty_store();
        let state2 = state1.clone();

        state1
            .store()
            .create_zone(&NewZone {
                name: "Shared".to_string(),
                category: ZoneCategory::Safe,
                latitude: 37.7694,
                longitude: -122.4862,
                radius_km: 1.5,
                address: None,
                description: None,
            })
            .unwrap();

        assert_eq!(state2.store().zone_count().unwrap(), 1);
    }

    #[test]
    fn open_rejects_unwritable_path() {
        let result = AppState::open("/nonexistent-dir/zones.db");
        assert!(result.is_err());
    }

    #[test]
    fn debug_reports_client_presence() {
        let debug = format!("{:?}", state_with_empty_store());
        assert!(debug.contains("has_geocoder"));
        assert!(debug.contains("false"));
    }
}
