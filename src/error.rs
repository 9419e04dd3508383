//! Error types for the crowd monitoring core

use thiserror::Error;

/// Result type alias for the crowd monitoring core
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during tracking and analytics
#[derive(Error, Debug)]
pub enum Error {
    #[error("innovation covariance matrix is singular")]
    SingularInnovation,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
