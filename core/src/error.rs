//! Error types for the comments API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the raw status
//! code and body for debugging. A body that does not match the expected
//! shape is a `Decode` error, returned like any other failure.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("decoding failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The round-trip itself failed (connection refused, no stub, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The in-flight request was cancelled before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The task running the request panicked or was aborted.
    #[error("request task failed: {0}")]
    TaskFailed(String),

    #[error("no tokio runtime available to execute the request")]
    NoRuntime,
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}
