//! Client Error Types
//!
//! Errors raised while talking to the dashboard backend.

use thiserror::Error;

/// Errors that can occur when communicating with the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, DNS failure, etc.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response. `error` is the server's `error` field, the only
    /// text shown to users; `message` is that, the `message` field or the raw
    /// body, for logs.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        error: Option<String>,
        message: String,
    },

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Classify a transport error the same way for every call site
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Unavailable(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }

    /// Server-provided `error` text suitable for a user-facing notification
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ClientError::Api {
                error: Some(error), ..
            } if !error.trim().is_empty() => Some(error),
            _ => None,
        }
    }

    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;
