//! Client for a running drift webhook receiver
//!
//! Used by operators (through the CLI) to check liveness and to replay a
//! drift event by hand.

use drift_core::domain::drift::DriftEvent;
use drift_core::dto::webhook::{ErrorResponse, HealthResponse, WebhookResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// HTTP client for the receiver's API
#[derive(Debug, Clone)]
pub struct ReceiverClient {
    /// Base URL of the receiver (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ReceiverClient {
    /// Create a new receiver client
    ///
    /// # Example
    /// ```
    /// use drift_client::ReceiverClient;
    ///
    /// let client = ReceiverClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new receiver client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the receiver
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// POST /drift-webhook
    ///
    /// # Returns
    /// Whether a pipeline was triggered, with its reference when known
    pub async fn send_drift(&self, event: &DriftEvent) -> Result<WebhookResponse> {
        let url = format!("{}/drift-webhook", self.base_url);
        let response = self.client.post(&url).json(event).send().await?;

        self.handle_response(response).await
    }

    /// Check the status code and deserialize the JSON body
    ///
    /// Error bodies are `{"error": ...}`; the message is surfaced as-is.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::tests::spawn_server;
    use drift_core::dto::webhook::DispatchStatus;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ReceiverClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_send_drift_decodes_response() {
        let (base, captured) =
            spawn_server(200, r#"{"status":"triggered","pipeline_id":42}"#).await;

        let response = ReceiverClient::new(base)
            .send_drift(&DriftEvent::drift(true, Some(0.001)))
            .await
            .unwrap();

        assert_eq!(response.status, DispatchStatus::Triggered);
        assert_eq!(response.pipeline_id, Some(42));
        assert_eq!(captured.lock().unwrap()[0].0, "/drift-webhook");
    }

    #[tokio::test]
    async fn test_send_drift_surfaces_error_message() {
        let (base, _) = spawn_server(502, r#"{"error":"CI unreachable"}"#).await;

        let err = ReceiverClient::new(base)
            .send_drift(&DriftEvent::drift(true, None))
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert!(matches!(err, ClientError::ApiError { message, .. } if message == "CI unreachable"));
    }
}
