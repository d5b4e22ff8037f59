//! Error types for the REST API client

use lf_client_api::{status_line, FlowError};
use thiserror::Error;

/// Errors that can occur when using the REST API client
#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    Header(String),

    /// Non-success reply; `status_text` is the reason phrase the server sent
    #[error("{} - {}", status_line(.status, .status_text), .body)]
    ServerError {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("SSE stream error: {0}")]
    Sse(String),
}

/// Result type alias for REST client operations
pub type RestClientResult<T> = Result<T, RestClientError>;

impl From<RestClientError> for FlowError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::ServerError {
                status,
                status_text,
                body,
            } => FlowError::Transport {
                status,
                status_text,
                body,
            },
            RestClientError::Sse(message) => FlowError::Stream(message),
            other => FlowError::Network(other.to_string()),
        }
    }
}
