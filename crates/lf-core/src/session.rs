//! Flow run orchestration.

use lf_api_contract::{validation::validate_run_request, RunRequest, RunResponse};
use lf_client_api::{FlowError, FlowResult, FlowTransport, StreamConnector};
use lf_rest_client::{ClientConfig, EventSourceConnector, RestClient, RestClientResult};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info};

use crate::handler::StreamHandler;
use crate::stream::StreamHandle;

/// Result of a run that was started successfully
#[derive(Debug)]
pub struct RunOutcome {
    pub response: RunResponse,
    /// Present when a stream was attached for this run
    pub stream: Option<StreamHandle>,
}

impl RunOutcome {
    /// Final output text of a non-streaming run
    pub fn final_text(&self) -> FlowResult<&str> {
        Ok(self.response.message_text()?)
    }
}

/// Starts flow runs and owns the stream connections they open.
///
/// At most one stream attached by a controller is live: attaching a new one
/// closes the previous one.
pub struct SessionController {
    transport: Arc<dyn FlowTransport>,
    connector: Arc<dyn StreamConnector>,
    active: Mutex<Option<StreamHandle>>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn FlowTransport>, connector: Arc<dyn StreamConnector>) -> Self {
        Self {
            transport,
            connector,
            active: Mutex::new(None),
        }
    }

    /// Controller talking to the hosted service described by `config`
    pub fn rest(config: ClientConfig) -> RestClientResult<Self> {
        let transport = RestClient::new(config.clone())?;
        let connector = EventSourceConnector::new(config);
        Ok(Self::new(Arc::new(transport), Arc::new(connector)))
    }

    /// Start a run and return the service response unchanged
    pub async fn initiate(&self, request: &RunRequest) -> FlowResult<RunResponse> {
        validate_run_request(request)?;

        let endpoint = request.endpoint();
        let body = serde_json::to_value(request.body())
            .map_err(|e| FlowError::InvalidRequest(e.to_string()))?;

        info!(
            flow_id = %request.flow_id,
            stream = request.stream,
            "Initiating flow run"
        );
        let response = self.transport.post(&endpoint, &body, None).await?;
        debug!(%response, "Init response");

        Ok(RunResponse::new(response))
    }

    /// Open the stream at `stream_url` and dispatch its events to `handler`.
    ///
    /// A connection that cannot be opened is reported through `on_error`
    /// and yields an already finished handle.
    pub async fn attach_stream<H: StreamHandler>(
        &self,
        stream_url: &str,
        mut handler: H,
    ) -> StreamHandle {
        let handle = match self.connector.connect(stream_url).await {
            Ok(frames) => StreamHandle::spawn(stream_url.to_string(), frames, handler),
            Err(err) => {
                error!(url = stream_url, error = %err, "Stream error");
                handler.on_error(err);
                StreamHandle::failed(stream_url.to_string())
            }
        };

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle.clone());
        if let Some(previous) = previous {
            debug!(url = previous.url(), "Closing superseded stream");
            previous.close();
        }

        handle
    }

    /// Run a flow end to end.
    ///
    /// Initiation failures are reported once through `handler.on_error` and
    /// yield `None`. Streaming runs whose response carries a stream locator
    /// get a stream attached; every other response is returned as final.
    pub async fn run<H: StreamHandler>(
        &self,
        request: &RunRequest,
        mut handler: H,
    ) -> Option<RunOutcome> {
        let response = match self.initiate(request).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "Error running flow");
                handler.on_error(FlowError::initiation(err));
                return None;
            }
        };

        if !request.stream {
            return Some(RunOutcome {
                response,
                stream: None,
            });
        }

        let stream_url = match response.stream_url() {
            Ok(url) => Some(url.to_string()),
            Err(err) => {
                debug!(error = %err, "No stream locator, returning response as final");
                None
            }
        };

        let stream = match stream_url {
            Some(url) => {
                info!(%url, "Streaming from");
                Some(self.attach_stream(&url, handler).await)
            }
            None => None,
        };

        Some(RunOutcome { response, stream })
    }

    /// Stream most recently attached by this controller
    pub fn active_stream(&self) -> Option<StreamHandle> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Close the stream most recently attached by this controller, if any
    pub fn close_stream(&self) {
        if let Some(handle) = self.active_stream() {
            handle.close();
        }
    }
}
