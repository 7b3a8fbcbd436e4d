//! Health Check API Handler
//!
//! Liveness only: never touches the CI system.

use axum::{Json, http::StatusCode};
use drift_core::dto::webhook::HealthResponse;

/// GET /health
/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse::ok()))
}
