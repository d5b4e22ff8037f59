//! Error types for API contract validation and parsing

use thiserror::Error;

/// Errors that can occur during API contract validation and parsing
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid input/output type: {0}")]
    InvalidIoType(String),

    #[error("Malformed response: no value at {path}")]
    MalformedResponse { path: String },
}

impl ApiContractError {
    /// Create a malformed-response error for the given response path.
    pub fn malformed<S: Into<String>>(path: S) -> Self {
        Self::MalformedResponse { path: path.into() }
    }
}
