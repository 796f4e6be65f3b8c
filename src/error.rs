//! Error types for the assignment engine and its collaborators

use thiserror::Error;

/// Failure talking to Microsoft Graph.
///
/// Transient 429/5xx responses are retried inside the client; anything that
/// reaches the engine as a `TransportError` is final for that call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Graph answered with a non-success status.
    #[error("Graph API error {status}: {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A raw assignment record that does not fit its category's schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("assignment record is not a JSON object")]
    NotAnObject,

    #[error("assignment record is missing `{0}`")]
    MissingField(&'static str),

    #[error("assignment record has an invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// The objects of a category could not be listed.
#[derive(Debug, Error)]
#[error("failed to list {category}: {source}")]
pub struct CategoryFetchError {
    pub category: String,
    #[source]
    pub source: TransportError,
}

/// The category table or run options are unusable. Always fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("category table is empty")]
    EmptyTable,

    #[error("category `{key}` has an empty {field}")]
    EmptyField { key: String, field: &'static str },

    #[error("category `{key}` has an invalid {field} `{value}`")]
    InvalidSegment {
        key: String,
        field: &'static str,
        value: String,
    },

    #[error("category `{0}` appears more than once")]
    DuplicateCategory(String),

    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}
