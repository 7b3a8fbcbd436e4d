//! API Module
//!
//! HTTP API layer for the receiver.

pub mod error;
pub mod health;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::DispatchService;

/// Create the main API router with all endpoints
pub fn create_router(service: Arc<DispatchService>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Drift detector callback
        .route("/drift-webhook", post(webhook::drift_webhook))
        // Add state and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}
