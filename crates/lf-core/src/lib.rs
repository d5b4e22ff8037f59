//! Flow run orchestration for the hosted flow-run service.
//!
//! The [`SessionController`] starts runs through a [`FlowTransport`], finds
//! the stream locator of streaming runs and owns the resulting SSE
//! connection until it closes, fails, is cancelled, or is superseded.

pub mod handler;
pub mod session;
pub mod stream;

/// Core result type used throughout the flow-run client.
pub type Result<T> = std::result::Result<T, FlowError>;

pub use lf_client_api::{FlowError, FlowTransport, StreamConnector};

/// Caller-supplied receivers of stream events.
pub use handler::{CallbackHandler, StreamHandler};

/// Run orchestration.
pub use session::{RunOutcome, SessionController};

/// Streaming connection lifecycle.
pub use stream::{StreamHandle, StreamState, CANCELLED_REASON, CLOSED_REASON};
