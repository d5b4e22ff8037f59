//! Main REST API client implementation

use async_trait::async_trait;
use lf_client_api::{FlowResult, FlowTransport};
use reqwest::{Client as HttpClient, Response};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::auth::request_headers;
use crate::config::ClientConfig;
use crate::error::{RestClientError, RestClientResult};

const USER_AGENT: &str = concat!("lf-rest-client/", env!("CARGO_PKG_VERSION"));

/// REST API client for the flow-run service
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    config: ClientConfig,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(config: ClientConfig) -> RestClientResult<Self> {
        let http_client = HttpClient::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a client from a base URL string and a bearer token
    pub fn from_url(base_url: &str, token: impl Into<String>) -> RestClientResult<Self> {
        Self::new(ClientConfig::from_url(base_url, token)?)
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST a JSON body to `base_url + endpoint` and parse the JSON reply.
    ///
    /// Failures are logged here before they are returned.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        headers: Option<&HashMap<String, String>>,
    ) -> RestClientResult<serde_json::Value> {
        let result = self.send_post(endpoint, body, headers).await;

        if let Err(err) = &result {
            match err {
                RestClientError::ServerError { status, .. } => {
                    error!(status, endpoint, error = %err, "Request failed")
                }
                _ => error!(endpoint, error = %err, "Request failed"),
            }
        }

        result
    }

    async fn send_post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        headers: Option<&HashMap<String, String>>,
    ) -> RestClientResult<serde_json::Value> {
        let url = self.config.endpoint_url(endpoint)?;
        let headers = request_headers(self.config.credential(), headers)?;
        let payload = serde_json::to_vec(body)?;

        debug!(%url, bytes = payload.len(), "POST");
        let response = self
            .http_client
            .post(url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> RestClientResult<serde_json::Value> {
        let status = response.status();
        let status_text = reason_phrase(&response)
            .or(status.canonical_reason())
            .unwrap_or("")
            .to_string();
        let text = response.text().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), "Response received");
            return Ok(serde_json::from_str(&text)?);
        }

        // Re-serialize JSON bodies compactly, keep anything else verbatim.
        let body = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => json.to_string(),
            Err(_) => text,
        };
        Err(RestClientError::ServerError {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

/// Reason phrase from the status line, present only when it differs from the
/// canonical one for the code.
fn reason_phrase(response: &Response) -> Option<&str> {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
}

#[async_trait]
impl FlowTransport for RestClient {
    async fn post(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
        headers: Option<&HashMap<String, String>>,
    ) -> FlowResult<serde_json::Value> {
        Ok(self.post_json(endpoint, body, headers).await?)
    }
}
