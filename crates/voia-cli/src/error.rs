use std::fmt::Display;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] voia_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Record ID cannot be empty")]
    EmptyRecordId,
    #[error("No {kind} found for id/prefix: {query}")]
    RecordNotFound { kind: &'static str, query: String },
    #[error("{0}")]
    AmbiguousRecordId(String),
    #[error("Invalid month '{0}'. Use 1-12 or a month name.")]
    InvalidMonth(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Profile '{0}' is not signed in. Run `voia auth login --email <email> --password <password>`.")]
    NotSignedIn(String),
}

impl CliError {
    pub fn auth(error: impl Display) -> Self {
        Self::Auth(error.to_string())
    }
}
