//! Error types for analytics API calls
//!
//! Errors are classified by where they happened:
//! - Transport: the request never produced a 2xx response (HTTP status, connection, timeout)
//! - DataShape: a 2xx response whose body is not the JSON we expect
//!
//! Callers treat both the same way: the fetch cycle ends in an error state and
//! the next apply starts over.

use thiserror::Error;

/// Generic message for responses that do not match the API contract.
pub const DATA_SHAPE_MESSAGE: &str = "Failed to load dashboard data.";

/// Error types for analytics API calls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    DataShape(String),
}

impl FetchError {
    /// Build an HTTP error, falling back to the status text when the body is empty.
    pub fn http(status: u16, body: &str, status_text: &str) -> Self {
        let body = if body.trim().is_empty() {
            status_text.to_string()
        } else {
            body.to_string()
        };
        FetchError::Http { status, body }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Http { .. } | FetchError::Network(_) => ErrorKind::Transport,
            FetchError::DataShape(_) => ErrorKind::DataShape,
        }
    }

    /// Message shown to the user for a failed fetch cycle.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::DataShape(_) => DATA_SHAPE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::DataShape(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::DataShape(err.to_string())
    }
}

/// Serializable error representation for consumers
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub message: String,
    pub error_type: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Transport,
    DataShape,
}

impl From<&FetchError> for FetchFailure {
    fn from(err: &FetchError) -> Self {
        FetchFailure {
            message: err.user_message(),
            error_type: err.kind(),
        }
    }
}
