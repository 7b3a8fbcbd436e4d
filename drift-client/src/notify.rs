//! Notification sink
//!
//! Posts a short summary of a dispatch outcome to a Slack-style incoming
//! webhook. Delivery is best effort: callers log failures and move on.

use async_trait::async_trait;
use drift_core::domain::trigger::TriggerResult;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::{NotifyError, TriggerError};

/// Outcome summary sent to operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Triggered {
        git_ref: String,
        pipeline_id: Option<u64>,
        pipeline_url: Option<String>,
    },
    Failed {
        git_ref: String,
        reason: String,
    },
}

impl Notification {
    pub fn triggered(git_ref: impl Into<String>, result: &TriggerResult) -> Self {
        Self::Triggered {
            git_ref: git_ref.into(),
            pipeline_id: result.pipeline_id,
            pipeline_url: result.pipeline_url.clone(),
        }
    }

    pub fn failed(git_ref: impl Into<String>, error: &TriggerError) -> Self {
        let reason = match error {
            TriggerError::RemoteRejected { status, .. } => {
                format!("CI rejected the trigger with HTTP {}", status)
            }
            TriggerError::Transport(err) if err.is_timeout() => {
                "CI did not answer before the deadline".to_string()
            }
            TriggerError::Transport(_) => "CI could not be reached".to_string(),
            TriggerError::Configuration(err) => err.to_string(),
        };

        Self::Failed {
            git_ref: git_ref.into(),
            reason,
        }
    }

    /// Message text; never includes response bodies, which may echo secrets
    pub fn text(&self) -> String {
        match self {
            Self::Triggered {
                git_ref,
                pipeline_id,
                pipeline_url,
            } => {
                let mut text = match pipeline_id {
                    Some(id) => format!(
                        ":rocket: Drift detected, retrain pipeline #{} started on `{}`",
                        id, git_ref
                    ),
                    None => format!(
                        ":rocket: Drift detected, retrain pipeline started on `{}`",
                        git_ref
                    ),
                };
                if let Some(url) = pipeline_url {
                    text.push_str(&format!("\n{}", url));
                }
                text
            }
            Self::Failed { git_ref, reason } => format!(
                ":warning: Drift detected, but the retrain pipeline on `{}` was not started: {}",
                git_ref, reason
            ),
        }
    }
}

/// Destination for outcome summaries
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SlackMessage<'a> {
    text: &'a str,
}

/// Slack incoming-webhook sink
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
}

impl SlackNotifier {
    /// Create a notifier whose calls are bounded by `timeout`
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

#[async_trait]
impl NotificationSink for SlackNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let text = notification.text();
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&SlackMessage { text: &text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Notification delivered");
        Ok(())
    }
}
