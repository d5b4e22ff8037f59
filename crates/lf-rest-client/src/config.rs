//! Client configuration

use url::Url;

use crate::auth::Credential;
use crate::error::RestClientResult;

/// Hosted service the client talks to when no base URL is given
pub const DEFAULT_BASE_URL: &str = "https://api.langflow.astra.datastax.com";

/// Endpoint and credential of one client instance
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    credential: Credential,
}

impl ClientConfig {
    pub fn new(base_url: Url, credential: Credential) -> Self {
        Self {
            base_url,
            credential,
        }
    }

    /// Create a config from a base URL string and a bearer token
    pub fn from_url(base_url: &str, token: impl Into<String>) -> RestClientResult<Self> {
        Ok(Self::new(Url::parse(base_url)?, Credential::bearer(token)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Absolute URL of a relative endpoint.
    ///
    /// The endpoint is appended to the base URL text, so a path prefix on
    /// the base URL is preserved.
    pub fn endpoint_url(&self, endpoint: &str) -> RestClientResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }
}
