//! Error types surfaced by the record store and origin lookup.

use thiserror::Error;

/// Failure of a [`Directory`](crate::directory::Directory) operation.
///
/// A failed operation never leaves partial state behind: the in-memory
/// view and the persisted state are both unchanged.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Required fields missing or invalid. Carries the field names.
    #[error("missing or invalid field(s): {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("builder not found: {0}")]
    NotFound(String),

    /// Read or write failure in the persistence backend.
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl DirectoryError {
    /// Short, caller-safe message. Store failures are reported generically
    /// so backend paths and driver messages stay out of API responses.
    pub fn public_message(&self) -> String {
        match self {
            DirectoryError::Store(_) => "the builder store could not be read or written".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Failure to turn a near-query into an origin coordinate.
#[derive(Debug, Error, PartialEq)]
pub enum OriginError {
    #[error("latitude/longitude out of range: {lat}, {lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("could not locate zip code {0}")]
    UnknownZip(String),

    #[error("provide lat and lng, a zip code, or a city and state")]
    Missing,
}
