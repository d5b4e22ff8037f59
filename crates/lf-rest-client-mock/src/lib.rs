//! Mock transport and stream connector backed by canned responses

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::{self, StreamExt};
use lf_api_contract::SseFrame;
use lf_client_api::{FlowError, FlowResult, FlowTransport, FrameStream, StreamConnector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub body: serde_json::Value,
    pub headers: Option<HashMap<String, String>>,
}

/// Transport that records every request and answers with a fixed result
pub struct MockTransport {
    reply: FlowResult<serde_json::Value>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn responding(body: serde_json::Value) -> Self {
        Self {
            reply: Ok(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: FlowError) -> Self {
        Self {
            reply: Err(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl FlowTransport for MockTransport {
    async fn post(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        headers: Option<&HashMap<String, String>>,
    ) -> FlowResult<serde_json::Value> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                endpoint: endpoint.to_string(),
                body: body.clone(),
                headers: headers.cloned(),
            });
        }
        self.reply.clone()
    }
}

enum Script {
    Frames {
        frames: Vec<FlowResult<SseFrame>>,
        hold_open: bool,
    },
    Channel(Mutex<Option<mpsc::UnboundedReceiver<FlowResult<SseFrame>>>>),
    Refuse(FlowError),
}

/// Connector that replays scripted frames and tracks open connections
pub struct MockConnector {
    script: Script,
    urls: Mutex<Vec<String>>,
    closed: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Replay `frames`, then end the stream
    pub fn with_frames(frames: Vec<FlowResult<SseFrame>>) -> Self {
        Self::new(Script::Frames {
            frames,
            hold_open: false,
        })
    }

    /// Replay `frames`, then keep the connection open without further events
    pub fn with_frames_held_open(frames: Vec<FlowResult<SseFrame>>) -> Self {
        Self::new(Script::Frames {
            frames,
            hold_open: true,
        })
    }

    /// Feed frames from a channel; only the first connection receives them
    pub fn with_channel() -> (Self, mpsc::UnboundedSender<FlowResult<SseFrame>>) {
        let (tx, rx) = mpsc::unbounded();
        (Self::new(Script::Channel(Mutex::new(Some(rx)))), tx)
    }

    /// Fail every connection attempt
    pub fn refusing(err: FlowError) -> Self {
        Self::new(Script::Refuse(err))
    }

    fn new(script: Script) -> Self {
        Self {
            script,
            urls: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// URLs of every connection attempt, in order
    pub fn connected_urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Number of opened streams that have since been dropped
    pub fn closed_connections(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of opened streams still alive
    pub fn open_connections(&self) -> usize {
        self.connected_urls().len() - self.closed_connections()
    }
}

/// Counts a connection as closed when the stream owning it is dropped
struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StreamConnector for MockConnector {
    async fn connect(&self, stream_url: &str) -> FlowResult<FrameStream> {
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(stream_url.to_string());
        }

        let frames: FrameStream = match &self.script {
            Script::Refuse(err) => {
                // A refused connection was never open.
                self.closed.fetch_add(1, Ordering::SeqCst);
                return Err(err.clone());
            }
            Script::Frames { frames, hold_open } => {
                let replay = stream::iter(frames.clone());
                if *hold_open {
                    replay.chain(stream::pending()).boxed()
                } else {
                    replay.boxed()
                }
            }
            Script::Channel(rx) => match rx.lock().ok().and_then(|mut rx| rx.take()) {
                Some(rx) => rx.boxed(),
                None => stream::empty().boxed(),
            },
        };

        let guard = CloseGuard(self.closed.clone());
        Ok(frames
            .map(move |frame| {
                let _ = &guard;
                frame
            })
            .boxed())
    }
}
