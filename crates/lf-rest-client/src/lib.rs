//! REST API client for the hosted flow-run service
//!
//! This crate provides the HTTP transport used to start flow runs and the
//! SSE connector used to follow streaming runs. Both authenticate with the
//! bearer credential of an immutable [`ClientConfig`].

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod sse;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use sse::EventSourceConnector;
