//! Pipeline Trigger Client
//!
//! Sends exactly one trigger request per call to the CI trigger endpoint.
//! No retries, no backoff: retrying is left to the caller.

use async_trait::async_trait;
use drift_core::domain::trigger::{TriggerRequest, TriggerResult};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::TriggerError;

/// Something that can start a pipeline run
#[async_trait]
pub trait PipelineTrigger: Send + Sync {
    /// Submit one trigger request and interpret the immediate acknowledgment
    async fn submit(&self, request: &TriggerRequest) -> Result<TriggerResult, TriggerError>;
}

/// HTTP implementation of [`PipelineTrigger`]
#[derive(Debug, Clone)]
pub struct TriggerClient {
    client: Client,
}

impl TriggerClient {
    /// Create a trigger client whose calls are bounded by `timeout`
    ///
    /// A timeout is reported as [`TriggerError::Transport`].
    pub fn new(timeout: Duration) -> Result<Self, TriggerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("drift-dispatcher/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PipelineTrigger for TriggerClient {
    async fn submit(&self, request: &TriggerRequest) -> Result<TriggerResult, TriggerError> {
        request.validate()?;

        let url = request.trigger_url();
        let variables: Vec<&str> = request.variables.names().collect();
        tracing::info!(
            url = %url,
            git_ref = %request.git_ref,
            variables = ?variables,
            "Triggering pipeline"
        );

        let response = self
            .client
            .post(&url)
            .json(&request.body())
            .send()
            .await
            .inspect_err(|e| tracing::error!("Pipeline trigger request failed: {}", e))?;

        let status = response.status();
        // Classification follows the status line even if the body is cut short
        let raw_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Could not read trigger response body: {}", e);
                String::new()
            }
        };

        if status != StatusCode::CREATED {
            tracing::error!("Pipeline trigger failed with HTTP {}", status.as_u16());
            tracing::debug!("Response: {}", raw_body);
            return Err(TriggerError::RemoteRejected {
                status: status.as_u16(),
                body: raw_body,
            });
        }

        let result = TriggerResult::from_response(request, status.as_u16(), raw_body);
        match result.pipeline_id {
            Some(id) => tracing::info!("Pipeline {} triggered", id),
            None => tracing::warn!("Pipeline triggered but response carried no id"),
        }

        Ok(result)
    }
}
