use thiserror::Error;

use crate::zone::ZoneId;

/// Convenient result alias for the evaczone library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when zone data fails validation at construction or update time.
    #[error("invalid zone data: {reason}")]
    InvalidZone { reason: String },

    /// Raised when a zone id does not exist in the store.
    #[error("zone {id} not found")]
    ZoneNotFound { id: ZoneId },

    /// Raised when a category label is outside the closed enumeration.
    #[error("unknown zone category: {label}")]
    UnknownCategory { label: String },

    /// Raised when an outbound client is constructed without its credential.
    #[error("missing credential for {service}")]
    MissingCredential { service: String },

    /// Raised when a third-party API response cannot be interpreted.
    #[error("unexpected {service} response: {message}")]
    UnexpectedResponse { service: String, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidZone`] with a formatted reason.
    pub fn invalid_zone(reason: impl Into<String>) -> Self {
        Error::InvalidZone {
            reason: reason.into(),
        }
    }
}
