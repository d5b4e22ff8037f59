//! Server-Sent Events (SSE) streaming support

use async_trait::async_trait;
use eventsource_client as es;
use es::Client as _;
use futures::{future, stream, StreamExt};
use lf_api_contract::{validation::resolve_stream_url, SseFrame};
use lf_client_api::{FlowError, FlowResult, FrameStream, StreamConnector};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{RestClientError, RestClientResult};

/// Opens SSE connections to stream locators with the client's credential.
///
/// Reconnection is disabled: a dropped connection ends the stream with a
/// single error instead of being retried.
#[derive(Debug, Clone)]
pub struct EventSourceConnector {
    config: ClientConfig,
}

impl EventSourceConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Open a frame stream for `stream_url`, resolved against the base URL
    pub fn open(&self, stream_url: &str) -> RestClientResult<FrameStream> {
        let url = resolve_stream_url(self.config.base_url(), stream_url)
            .map_err(|e| RestClientError::Sse(e.to_string()))?;

        info!(%url, "Opening event stream");
        let client = es::ClientBuilder::for_url(url.as_str())
            .map_err(sse_error)?
            .header("Authorization", &self.config.credential().header_value())
            .map_err(sse_error)?
            .reconnect(es::ReconnectOptions::reconnect(false).build())
            .build();

        Ok(client
            .stream()
            .filter_map(|item| future::ready(frame_from(item)))
            .chain(stream::once(future::ready(Err(FlowError::Stream(
                ENDED.to_string(),
            )))))
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .boxed())
    }
}

const ENDED: &str = "event stream ended";

fn sse_error(err: es::Error) -> RestClientError {
    RestClientError::Sse(format!("{err:?}"))
}

/// Keep dispatchable events and errors; comments and connection notices are dropped.
fn frame_from(item: Result<es::SSE, es::Error>) -> Option<FlowResult<SseFrame>> {
    match item {
        Ok(es::SSE::Event(event)) => Some(Ok(SseFrame {
            event_type: event.event_type,
            data: event.data,
        })),
        Ok(_) => None,
        Err(err) => Some(Err(FlowError::Stream(format!("{err:?}")))),
    }
}

#[async_trait]
impl StreamConnector for EventSourceConnector {
    async fn connect(&self, stream_url: &str) -> FlowResult<FrameStream> {
        Ok(self.open(stream_url)?)
    }
}
