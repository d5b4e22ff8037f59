//! Streaming connection lifecycle.
//!
//! A stream starts `Open` and ends in exactly one of `Closed` or `Errored`.
//! One dispatch task owns the connection and the handler; it delivers
//! updates in server order, reports the terminal event once and then drops
//! the connection.

use futures::StreamExt;
use lf_api_contract::{CLOSE_EVENT, MESSAGE_EVENT};
use lf_client_api::{FlowError, FrameStream};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

use crate::handler::StreamHandler;

/// Reason reported when the server closes a stream without one
pub const CLOSED_REASON: &str = "Stream closed";

/// Reason reported when the caller cancels a stream
pub const CANCELLED_REASON: &str = "Stream cancelled";

/// Lifecycle state of an attached stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Closed,
    Errored,
}

struct Shared {
    url: String,
    state: Mutex<StreamState>,
    cancel: Notify,
    finished: watch::Sender<bool>,
}

impl Shared {
    fn new(url: String, state: StreamState, finished: bool) -> Arc<Self> {
        let (finished, _) = watch::channel(finished);
        Arc::new(Self {
            url,
            state: Mutex::new(state),
            cancel: Notify::new(),
            finished,
        })
    }

    fn state(&self) -> StreamState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `Open` to `next`; false if the stream already left `Open`.
    fn leave_open(&self, next: StreamState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != StreamState::Open {
            return false;
        }
        *state = next;
        true
    }
}

/// Caller's handle on an attached stream.
///
/// Dropping the handle does not close the stream.
#[derive(Clone)]
pub struct StreamHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("url", &self.shared.url)
            .field("state", &self.state())
            .finish()
    }
}

impl StreamHandle {
    /// Spawn the dispatch task for an open connection
    pub(crate) fn spawn<H: StreamHandler>(url: String, frames: FrameStream, handler: H) -> Self {
        let shared = Shared::new(url, StreamState::Open, false);
        tokio::spawn(dispatch(shared.clone(), frames, handler));
        Self { shared }
    }

    /// Handle of a stream whose connection could not be opened
    pub(crate) fn failed(url: String) -> Self {
        Self {
            shared: Shared::new(url, StreamState::Errored, true),
        }
    }

    /// Stream locator this handle is attached to
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    pub fn state(&self) -> StreamState {
        self.shared.state()
    }

    pub fn is_open(&self) -> bool {
        self.state() == StreamState::Open
    }

    /// Whether the handler has seen its terminal event and the connection is gone
    pub fn is_finished(&self) -> bool {
        *self.shared.finished.borrow()
    }

    /// Cancel the stream.
    ///
    /// The handler receives a single `on_close` with [`CANCELLED_REASON`].
    /// Closing a stream that already ended is a no-op.
    pub fn close(&self) {
        if self.shared.leave_open(StreamState::Closed) {
            debug!(url = %self.shared.url, "Cancelling stream");
            self.shared.cancel.notify_one();
        }
    }

    /// Wait until the stream has ended and return its final state
    pub async fn wait(&self) -> StreamState {
        let mut finished = self.shared.finished.subscribe();
        // The sender lives in `shared`, which this handle keeps alive.
        let _ = finished.wait_for(|done| *done).await;
        self.state()
    }
}

enum Exit {
    Closed(String),
    Errored(FlowError),
    Cancelled,
}

/// Marks the stream finished when dispatch returns or unwinds.
///
/// A stream still `Open` at that point lost its task to a panic and is
/// recorded as `Errored`.
struct FinishGuard(Arc<Shared>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        if self.0.leave_open(StreamState::Errored) {
            error!(url = %self.0.url, "Stream dispatch ended abnormally");
        }
        self.0.finished.send_replace(true);
    }
}

async fn dispatch<H: StreamHandler>(shared: Arc<Shared>, frames: FrameStream, handler: H) {
    // Declared first so the connection and handler are dropped before it.
    let _finish = FinishGuard(shared.clone());
    let mut frames = frames;
    let mut handler = handler;

    let exit = loop {
        tokio::select! {
            biased;
            _ = shared.cancel.notified() => break Exit::Cancelled,
            frame = frames.next() => match frame {
                Some(Ok(frame)) => match frame.event_type.as_str() {
                    MESSAGE_EVENT => match serde_json::from_str(&frame.data) {
                        Ok(payload) => {
                            if shared.state() != StreamState::Open {
                                break Exit::Cancelled;
                            }
                            handler.on_update(payload);
                        }
                        Err(err) => {
                            warn!(
                                url = %shared.url,
                                error = %err,
                                data = %frame.data,
                                "Skipping unparseable stream message"
                            );
                        }
                    },
                    CLOSE_EVENT => {
                        let reason = if frame.data.trim().is_empty() {
                            CLOSED_REASON.to_string()
                        } else {
                            frame.data
                        };
                        break Exit::Closed(reason);
                    }
                    other => debug!(url = %shared.url, event = other, "Ignoring stream event"),
                },
                Some(Err(err)) => break Exit::Errored(err),
                None => {
                    break Exit::Errored(FlowError::Stream(
                        "connection ended without a close event".to_string(),
                    ))
                }
            },
        }
    };

    let claimed = match &exit {
        Exit::Closed(_) => shared.leave_open(StreamState::Closed),
        Exit::Errored(_) => shared.leave_open(StreamState::Errored),
        Exit::Cancelled => false,
    };

    match exit {
        Exit::Closed(reason) if claimed => {
            info!(url = %shared.url, %reason, "Stream closed");
            handler.on_close(reason);
        }
        Exit::Errored(err) if claimed => {
            error!(url = %shared.url, error = %err, "Stream error");
            handler.on_error(err);
        }
        // Not claimed: `close()` won the race.
        _ => {
            info!(url = %shared.url, "Stream cancelled");
            handler.on_close(CANCELLED_REASON.to_string());
        }
    }
}
