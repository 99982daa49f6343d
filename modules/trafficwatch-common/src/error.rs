use thiserror::Error;

/// Malformed caller input. Checked before anything touches storage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid event type: {0}")]
    InvalidType(String),

    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),
}

#[derive(Error, Debug)]
pub enum TrafficWatchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrafficWatchError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        Self::Retrieval(err.to_string())
    }
}
