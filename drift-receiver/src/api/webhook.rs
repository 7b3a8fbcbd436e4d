//! Drift Webhook API Handler
//!
//! Validates the raw body itself so that unparseable JSON is reported with
//! the same `{"error": ...}` shape as every other rejection.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use drift_core::dto::webhook::WebhookResponse;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::service::{DispatchOutcome, DispatchService, ValidationError, validate_event};

/// POST /drift-webhook
/// Accept a drift event and trigger the retrain pipeline when drift is reported
pub async fn drift_webhook(
    State(service): State<Arc<DispatchService>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<WebhookResponse>> {
    let body = body.inspect_err(|e| tracing::warn!("Could not read request body: {}", e))?;
    let accepted = validate_event(&body).inspect_err(|e| match e {
        ValidationError::Malformed(detail) => tracing::warn!("Invalid JSON in request body: {}", detail),
        ValidationError::UnsupportedEvent(kind) => tracing::warn!("Unexpected event type: {:?}", kind),
        ValidationError::MissingIsDrift => tracing::warn!("Drift event without boolean is_drift"),
    })?;

    let response = match service.dispatch(accepted).await? {
        DispatchOutcome::Triggered(result) => WebhookResponse::from(&result),
        DispatchOutcome::Skipped => WebhookResponse::skipped(),
    };

    Ok(Json(response))
}
