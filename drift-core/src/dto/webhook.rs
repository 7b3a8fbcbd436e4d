//! Webhook response DTOs

use serde::{Deserialize, Serialize};

use crate::domain::trigger::TriggerResult;

/// Whether an accepted drift event started a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Triggered,
    Skipped,
}

/// Body of a `200` reply to `POST /drift-webhook`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: DispatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_url: Option<String>,
}

impl WebhookResponse {
    pub fn skipped() -> Self {
        Self {
            status: DispatchStatus::Skipped,
            pipeline_id: None,
            pipeline_url: None,
        }
    }
}

impl From<&TriggerResult> for WebhookResponse {
    fn from(result: &TriggerResult) -> Self {
        Self {
            status: DispatchStatus::Triggered,
            pipeline_id: result.pipeline_id,
            pipeline_url: result.pipeline_url.clone(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Body of every non-2xx webhook reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
