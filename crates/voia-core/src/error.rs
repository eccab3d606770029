//! Error types for voia-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using voia-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voia-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or malformed. Raised before any gateway call.
    #[error("{0}")]
    Validation(String),

    /// No authenticated user is available for an operation that needs one
    #[error("You must be signed in")]
    NotAuthenticated,

    /// Remote gateway rejected or failed a query/insert/update/delete
    #[error("{0}")]
    Gateway(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Image upload failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// Image deletion companion endpoint failed
    #[error("Image deletion error: {0}")]
    ImageDeletion(String),

    /// Authentication service error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// True for errors raised locally before reaching the gateway.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotAuthenticated)
    }
}
