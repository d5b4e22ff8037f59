//! Flow-run REST API contract types and validation
//!
//! This crate defines the request and response shapes of the hosted flow
//! runner, the streamed event model, and the accessors that pull nested
//! fields out of a run response. The types are shared between the REST
//! client, the session controller and the mock client.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
