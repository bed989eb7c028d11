//! Error types for the consent service client.
//!
//! # Design
//! A single enum covers the three failure families the client can hit:
//! construction (`InvalidApiKey`, `Config`), data format (`InvalidTimestamp`,
//! `InvalidField`, `MissingField`, `Deserialization`) and the remote call
//! itself (`Transport`, status-derived variants, `Rejected`). `NotFound` and
//! `Unauthorized` get dedicated variants because callers branch on them; any
//! other non-2xx status lands in `HttpError` with the raw body.

use thiserror::Error;

/// Errors returned by `ConsentClient` and the domain objects it maps.
#[derive(Debug, Error)]
pub enum ConsentError {
    /// The API key was empty.
    #[error("invalid api key")]
    InvalidApiKey,

    /// The client configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A timestamp string did not match the expected format.
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A field carried a JSON value of the wrong type.
    #[error("field `{field}` must be {expected}")]
    InvalidField { field: String, expected: &'static str },

    /// A required field was absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The server returned 401 or 403: the API key was not accepted.
    #[error("api key rejected by the service")]
    Unauthorized,

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The service answered a write with a literal `false`.
    #[error("{operation} was rejected by the service")]
    Rejected { operation: &'static str },

    /// The response body decoded to an unexpected JSON shape.
    #[error("unexpected response to {operation}: expected {expected}")]
    UnexpectedResponse {
        operation: &'static str,
        expected: &'static str,
    },

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The base URL and path could not be joined into a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T, E = ConsentError> = std::result::Result<T, E>;
