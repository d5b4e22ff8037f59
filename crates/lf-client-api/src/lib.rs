//! Client API traits for the flow-run service
//!
//! The session controller talks to the network only through the two traits
//! defined here, so the REST client and the mock client are interchangeable.

use async_trait::async_trait;
use futures::stream::BoxStream;
use lf_api_contract::{ApiContractError, SseFrame};
use std::collections::HashMap;
use thiserror::Error;

/// Failures surfaced by transports, connectors and the session controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The service answered with a non-success status
    #[error("{} - {}", status_line(.status, .status_text), .body)]
    Transport {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request could not be sent or the response could not be parsed
    #[error("network error: {0}")]
    Network(String),

    /// The stream connection failed after it was attached
    #[error("stream error: {0}")]
    Stream(String),

    /// An expected field of the response is missing
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The run request was rejected before sending
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Starting the run failed
    #[error("Error initiating session: {source}")]
    Initiation { source: Box<FlowError> },
}

impl FlowError {
    /// Wrap a failure of the initiation call
    pub fn initiation(source: FlowError) -> Self {
        Self::Initiation {
            source: Box::new(source),
        }
    }

    /// HTTP status of a transport failure, looking through initiation wrapping
    pub fn status(&self) -> Option<u16> {
        match self {
            FlowError::Transport { status, .. } => Some(*status),
            FlowError::Initiation { source } => source.status(),
            _ => None,
        }
    }
}

impl From<ApiContractError> for FlowError {
    fn from(err: ApiContractError) -> Self {
        match err {
            ApiContractError::MalformedResponse { path } => FlowError::MalformedResponse(path),
            ApiContractError::Json(e) => FlowError::Network(e.to_string()),
            other => FlowError::InvalidRequest(other.to_string()),
        }
    }
}

/// `"{status} {status_text}"`, or just the status when the reason phrase is empty
pub fn status_line(status: &u16, status_text: &str) -> String {
    if status_text.is_empty() {
        status.to_string()
    } else {
        format!("{status} {status_text}")
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Stream of raw SSE frames from an open connection.
///
/// Dropping the stream closes the connection.
pub type FrameStream = BoxStream<'static, FlowResult<SseFrame>>;

/// Single-shot authenticated JSON POST
#[async_trait]
pub trait FlowTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        headers: Option<&HashMap<String, String>>,
    ) -> FlowResult<serde_json::Value>;
}

/// Opens server-push connections to stream locators
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, stream_url: &str) -> FlowResult<FrameStream>;
}
