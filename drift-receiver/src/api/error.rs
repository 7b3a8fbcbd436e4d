//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drift_client::TriggerError;
use drift_core::dto::webhook::ErrorResponse;

use crate::service::{DispatchError, ValidationError};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Inbound payload rejected
    BadRequest(String),
    /// Body over the extractor's size limit
    PayloadTooLarge,
    /// CI unreachable or declined the trigger
    BadGateway(String),
    /// Receiver is missing configuration it needs
    Misconfigured(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload too large".to_string(),
            ),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Misconfigured(msg) => {
                tracing::error!("Server misconfiguration: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest("malformed payload".to_string())
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Trigger(TriggerError::Configuration(e)) => {
                ApiError::Misconfigured(e.to_string())
            }
            DispatchError::Trigger(TriggerError::Transport(e)) if e.is_timeout() => {
                ApiError::BadGateway("CI did not respond in time".to_string())
            }
            DispatchError::Trigger(TriggerError::Transport(_)) => {
                ApiError::BadGateway("CI unreachable".to_string())
            }
            DispatchError::Trigger(TriggerError::RemoteRejected { status, .. }) => {
                ApiError::BadGateway(format!("CI rejected trigger with status {}", status))
            }
            DispatchError::Interrupted(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
