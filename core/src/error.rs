//! Error types for the movie API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because lookups frequently distinguish
//! "the movie does not exist" from "the server returned an unexpected
//! status." Other non-success responses land in `HttpError` with the raw
//! status code and body.

use thiserror::Error;

/// Errors returned by `MovieClient` parse methods, transports and the proxy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404 for a lookup.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the one the operation expects.
    #[error("Failed : HTTP error code : {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, reset, ...).
    #[error("transport failed: {0}")]
    TransportError(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration {key}={value:?}")]
    InvalidConfig { key: String, value: String },
}

impl ApiError {
    /// HTTP status carried by this error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
