//! Receivers of streamed run events.

use lf_api_contract::StreamEvent;
use lf_client_api::FlowError;
use tokio::sync::mpsc;

/// Receives the events of one streaming run.
///
/// `on_update` may be called any number of times. At most one of
/// `on_close` and `on_error` is called, and nothing is delivered after it.
/// `on_error` also reports a failed run initiation.
pub trait StreamHandler: Send + 'static {
    fn on_update(&mut self, payload: serde_json::Value);
    fn on_close(&mut self, reason: String);
    fn on_error(&mut self, error: FlowError);
}

/// Channel view of a stream: every callback becomes a [`StreamEvent`].
///
/// Send failures mean the receiver is gone and are ignored.
impl StreamHandler for mpsc::UnboundedSender<StreamEvent> {
    fn on_update(&mut self, payload: serde_json::Value) {
        let _ = self.send(StreamEvent::Update(payload));
    }

    fn on_close(&mut self, reason: String) {
        let _ = self.send(StreamEvent::Close(reason));
    }

    fn on_error(&mut self, error: FlowError) {
        let _ = self.send(StreamEvent::Error(error.to_string()));
    }
}

/// Handler assembled from three closures
pub struct CallbackHandler<U, C, E> {
    on_update: U,
    on_close: C,
    on_error: E,
}

impl<U, C, E> CallbackHandler<U, C, E>
where
    U: FnMut(serde_json::Value) + Send + 'static,
    C: FnMut(String) + Send + 'static,
    E: FnMut(FlowError) + Send + 'static,
{
    pub fn new(on_update: U, on_close: C, on_error: E) -> Self {
        Self {
            on_update,
            on_close,
            on_error,
        }
    }
}

impl<U, C, E> StreamHandler for CallbackHandler<U, C, E>
where
    U: FnMut(serde_json::Value) + Send + 'static,
    C: FnMut(String) + Send + 'static,
    E: FnMut(FlowError) + Send + 'static,
{
    fn on_update(&mut self, payload: serde_json::Value) {
        (self.on_update)(payload)
    }

    fn on_close(&mut self, reason: String) {
        (self.on_close)(reason)
    }

    fn on_error(&mut self, error: FlowError) {
        (self.on_error)(error)
    }
}
