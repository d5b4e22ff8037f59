//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Validate a run request before it is sent
pub fn validate_run_request(request: &RunRequest) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Resolve a stream locator against the service base URL.
///
/// Absolute locators are returned as-is, relative ones are joined onto `base`.
pub fn resolve_stream_url(base: &url::Url, locator: &str) -> Result<url::Url, ApiContractError> {
    Ok(base.join(locator)?)
}
