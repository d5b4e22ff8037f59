//! API contract types for the flow-run REST service

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::ApiContractError;

/// Input and output type tags understood by the flow runner.
///
/// Unknown tags are kept as given and sent to the service untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum IoType {
    #[default]
    Chat,
    Text,
    Any,
    Debug,
    Other(String),
}

impl IoType {
    pub fn as_str(&self) -> &str {
        match self {
            IoType::Chat => "chat",
            IoType::Text => "text",
            IoType::Any => "any",
            IoType::Debug => "debug",
            IoType::Other(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IoType {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chat" => Ok(IoType::Chat),
            "text" => Ok(IoType::Text),
            "any" => Ok(IoType::Any),
            "debug" => Ok(IoType::Debug),
            "" => Err(ApiContractError::InvalidIoType(s.to_string())),
            _ => Ok(IoType::Other(s.to_string())),
        }
    }
}

impl Serialize for IoType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IoType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(de::Error::custom)
    }
}

/// Per-component configuration overrides, keyed by component id.
///
/// The values are opaque to the client and forwarded untouched.
pub type Tweaks = HashMap<String, serde_json::Map<String, serde_json::Value>>;

/// Parameters of a single flow run
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RunRequest {
    #[validate(length(min = 1, message = "Flow id cannot be empty"))]
    pub flow_id: String,
    #[validate(length(min = 1, message = "Workflow namespace id cannot be empty"))]
    pub workflow_namespace_id: String,
    pub input_value: String,
    pub input_type: IoType,
    pub output_type: IoType,
    pub tweaks: Tweaks,
    pub stream: bool,
}

impl RunRequest {
    /// Create a chat-in, chat-out, non-streaming request without tweaks
    pub fn new(
        flow_id: impl Into<String>,
        workflow_namespace_id: impl Into<String>,
        input_value: impl Into<String>,
    ) -> Self {
        Self {
            flow_id: flow_id.into(),
            workflow_namespace_id: workflow_namespace_id.into(),
            input_value: input_value.into(),
            input_type: IoType::default(),
            output_type: IoType::default(),
            tweaks: Tweaks::new(),
            stream: false,
        }
    }

    pub fn with_input_type(mut self, input_type: IoType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_output_type(mut self, output_type: IoType) -> Self {
        self.output_type = output_type;
        self
    }

    pub fn with_tweaks(mut self, tweaks: Tweaks) -> Self {
        self.tweaks = tweaks;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Relative endpoint path that starts this run
    pub fn endpoint(&self) -> String {
        format!(
            "/lf/{}/api/v1/run/{}?stream={}",
            self.workflow_namespace_id, self.flow_id, self.stream
        )
    }

    /// JSON body sent to the run endpoint
    pub fn body(&self) -> RunBody<'_> {
        RunBody {
            input_value: &self.input_value,
            input_type: &self.input_type,
            output_type: &self.output_type,
            tweaks: &self.tweaks,
        }
    }
}

/// Wire shape of the run request body
#[derive(Debug, Clone, Serialize)]
pub struct RunBody<'a> {
    pub input_value: &'a str,
    pub input_type: &'a IoType,
    pub output_type: &'a IoType,
    pub tweaks: &'a Tweaks,
}

/// JSON pointer to the stream locator of the first component output
pub const STREAM_URL_POINTER: &str = "/outputs/0/outputs/0/artifacts/stream_url";

/// JSON pointer to the final message text of the first component output
pub const MESSAGE_TEXT_POINTER: &str = "/outputs/0/outputs/0/outputs/message/message/text";

/// Response of the run endpoint.
///
/// The service nests results as flow output groups holding component
/// outputs. Only a handful of fields matter to the client, so the body is
/// kept as JSON and read through the accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResponse(serde_json::Value);

impl RunResponse {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }

    /// Resolve a JSON pointer, failing with `MalformedResponse` when absent
    pub fn lookup(&self, pointer: &str) -> Result<&serde_json::Value, ApiContractError> {
        match self.0.pointer(pointer) {
            Some(serde_json::Value::Null) | None => Err(ApiContractError::malformed(pointer)),
            Some(value) => Ok(value),
        }
    }

    fn lookup_str(&self, pointer: &str) -> Result<&str, ApiContractError> {
        self.lookup(pointer)?
            .as_str()
            .ok_or_else(|| ApiContractError::malformed(pointer))
    }

    /// Stream locator of a streaming run
    pub fn stream_url(&self) -> Result<&str, ApiContractError> {
        let url = self.lookup_str(STREAM_URL_POINTER)?;
        if url.trim().is_empty() {
            return Err(ApiContractError::malformed(STREAM_URL_POINTER));
        }
        Ok(url)
    }

    /// Final output text of a non-streaming run
    pub fn message_text(&self) -> Result<&str, ApiContractError> {
        self.lookup_str(MESSAGE_TEXT_POINTER)
    }

    /// Session id assigned by the server, if any
    pub fn session_id(&self) -> Option<&str> {
        self.0.get("session_id").and_then(|v| v.as_str())
    }
}

impl From<serde_json::Value> for RunResponse {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A raw server-sent event frame as read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name, `message` for unnamed events
    pub event_type: String,
    pub data: String,
}

impl SseFrame {
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event_type: MESSAGE_EVENT.to_string(),
            data: data.into(),
        }
    }

    pub fn close() -> Self {
        Self {
            event_type: CLOSE_EVENT.to_string(),
            data: String::new(),
        }
    }
}

/// Event name of default SSE messages
pub const MESSAGE_EVENT: &str = "message";

/// Event name the service uses to signal end of stream
pub const CLOSE_EVENT: &str = "close";

/// Incremental events delivered for a streaming run
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A parsed message payload, carrying at least a `chunk` field
    Update(serde_json::Value),
    /// Connection-level failure description
    Error(String),
    /// End of stream with its reason
    Close(String),
}

impl StreamEvent {
    /// Text chunk of an update event, if it carries one
    pub fn chunk(&self) -> Option<&str> {
        match self {
            StreamEvent::Update(payload) => update_chunk(payload),
            _ => None,
        }
    }
}

/// Text chunk carried by an update payload
pub fn update_chunk(payload: &serde_json::Value) -> Option<&str> {
    payload.get("chunk").and_then(|c| c.as_str())
}
