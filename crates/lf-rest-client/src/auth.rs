//! Bearer authentication and request header assembly

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::collections::HashMap;
use std::fmt;

use crate::error::{RestClientError, RestClientResult};

/// Application token sent as `Authorization: Bearer <token>`
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header for this credential
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Build the headers of an outbound request.
///
/// Caller headers are applied first; `Authorization` and `Content-Type` are
/// inserted last so they always replace caller values of the same name.
pub fn request_headers(
    credential: &Credential,
    extra: Option<&HashMap<String, String>>,
) -> RestClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(extra) = extra {
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RestClientError::Header(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RestClientError::Header(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
    }

    let auth = HeaderValue::from_str(&credential.header_value())
        .map_err(|e| RestClientError::Header(format!("authorization: {e}")))?;
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}
