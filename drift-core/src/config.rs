//! Dispatcher configuration
//!
//! Resolved once at process start (flags over environment over defaults)
//! and read-only afterwards. Both the receiver and the CLI build their
//! trigger requests from it.

use std::time::Duration;
use thiserror::Error;

use crate::domain::trigger::{TriggerRequest, TriggerToken, TriggerVariables};

pub const DEFAULT_CI_URL: &str = "https://gitlab.com";
pub const DEFAULT_REF: &str = "main";
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_BIND_PORT: u16 = 8080;
pub const DEFAULT_TRIGGER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Operator-fixable configuration problem; never retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Process-wide dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// CI base URL (e.g., "https://gitlab.com")
    pub ci_url: String,

    pub project_id: String,

    pub trigger_token: TriggerToken,

    /// Branch or tag used when a request does not name one
    pub default_ref: String,

    pub bind_host: String,

    pub bind_port: u16,

    /// Optional Slack-style incoming webhook for outcome summaries
    pub slack_webhook_url: Option<String>,

    /// Deadline for the outbound trigger call
    pub trigger_timeout: Duration,

    /// Deadline for the notification call
    pub notify_timeout: Duration,
}

impl DispatcherConfig {
    /// Creates a configuration with defaults for everything but the credentials
    pub fn new(project_id: impl Into<String>, trigger_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            trigger_token: TriggerToken::new(trigger_token),
            ..Self::default()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Missing("project id"));
        }

        if self.trigger_token.is_empty() {
            return Err(ConfigError::Missing("trigger token"));
        }

        if self.default_ref.trim().is_empty() {
            return Err(ConfigError::Missing("ref"));
        }

        require_http_url("CI URL", &self.ci_url)?;

        if let Some(url) = &self.slack_webhook_url {
            require_http_url("notification URL", url)?;
        }

        if self.trigger_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "trigger timeout must be greater than 0".to_string(),
            ));
        }

        if self.notify_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "notification timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` the receiver binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// Builds a trigger request against the configured project and ref
    pub fn trigger_request(&self, variables: TriggerVariables) -> TriggerRequest {
        TriggerRequest {
            endpoint_base: self.ci_url.clone(),
            project_id: self.project_id.clone(),
            token: self.trigger_token.clone(),
            git_ref: self.default_ref.clone(),
            variables,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            ci_url: DEFAULT_CI_URL.to_string(),
            project_id: String::new(),
            trigger_token: TriggerToken::default(),
            default_ref: DEFAULT_REF.to_string(),
            bind_host: DEFAULT_BIND_HOST.to_string(),
            bind_port: DEFAULT_BIND_PORT,
            slack_webhook_url: None,
            trigger_timeout: Duration::from_secs(DEFAULT_TRIGGER_TIMEOUT_SECS),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        }
    }
}

fn require_http_url(name: &str, url: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Invalid(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.ci_url, "https://gitlab.com");
        assert_eq!(config.default_ref, "main");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.trigger_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_default_config_is_missing_credentials() {
        let config = DispatcherConfig::default();
        assert_eq!(config.validate(), Err(ConfigError::Missing("project id")));

        let config = DispatcherConfig::new("42", "");
        assert_eq!(config.validate(), Err(ConfigError::Missing("trigger token")));
    }

    #[test]
    fn test_config_validation() {
        let mut config = DispatcherConfig::new("42", "token");
        assert!(config.validate().is_ok());

        config.ci_url = "gitlab.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.ci_url = DEFAULT_CI_URL.to_string();

        config.slack_webhook_url = Some("hooks.slack.com".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.slack_webhook_url = None;

        config.trigger_timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_trigger_request_uses_config() {
        let mut config = DispatcherConfig::new("42", "token");
        config.default_ref = "release".to_string();

        let req = config.trigger_request(TriggerVariables::new().retrain(true));
        assert_eq!(req.project_id, "42");
        assert_eq!(req.git_ref, "release");
        assert_eq!(req.token.expose(), "token");
        assert_eq!(req.variables.get("TRIGGER_RETRAIN"), Some("true"));
    }
}
