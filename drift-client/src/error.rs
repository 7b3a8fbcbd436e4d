//! Error types for the drift client

use drift_core::config::ConfigError;
use thiserror::Error;

/// Result type alias for receiver client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Why a trigger submission did not start a pipeline
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Missing or invalid request data; no network call was made
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The CI server was never reached (connect, DNS, timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The CI server answered with something other than `201 Created`
    #[error("CI rejected trigger (status {status}): {body}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Raw response body, unmodified
        body: String,
    },
}

impl TriggerError {
    /// Check if the call ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    /// Status code reported by the CI server, if it was reached
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure to deliver an outcome summary to the notification sink
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("notification sink returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors that can occur when talking to a running receiver
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Receiver returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the receiver
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}
