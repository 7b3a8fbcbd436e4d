//! Receiver configuration
//!
//! Command-line flags, each falling back to an environment variable and
//! then to a default. Resolved into a [`DispatcherConfig`] once at startup.

use clap::Parser;
use drift_core::config::{
    DEFAULT_BIND_HOST, DEFAULT_BIND_PORT, DEFAULT_CI_URL, DEFAULT_NOTIFY_TIMEOUT_SECS,
    DEFAULT_REF, DEFAULT_TRIGGER_TIMEOUT_SECS, DispatcherConfig,
};
use drift_core::domain::trigger::TriggerToken;
use std::time::Duration;

/// Drift detection webhook server
#[derive(Debug, Parser)]
#[command(name = "drift-receiver")]
#[command(about = "Receives drift events and triggers the retrain pipeline", long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "WEBHOOK_HOST", default_value = DEFAULT_BIND_HOST)]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = DEFAULT_BIND_PORT)]
    pub port: u16,

    /// CI base URL
    #[arg(long, env = "GITLAB_URL", default_value = DEFAULT_CI_URL)]
    pub gitlab_url: String,

    /// CI project id (required)
    #[arg(long, env = "GITLAB_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Pipeline trigger token (required)
    #[arg(long, env = "GITLAB_TRIGGER_TOKEN", hide_env_values = true)]
    pub trigger_token: Option<String>,

    /// Branch or tag to run the pipeline on
    #[arg(long, env = "GITLAB_BRANCH", default_value = DEFAULT_REF)]
    pub branch: String,

    /// Slack incoming webhook for outcome summaries
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook: Option<String>,

    /// Deadline for the trigger call, in seconds
    #[arg(long, env = "TRIGGER_TIMEOUT_SECS", default_value_t = DEFAULT_TRIGGER_TIMEOUT_SECS)]
    pub trigger_timeout: u64,

    /// Deadline for the notification call, in seconds
    #[arg(long, env = "NOTIFY_TIMEOUT_SECS", default_value_t = DEFAULT_NOTIFY_TIMEOUT_SECS)]
    pub notify_timeout: u64,
}

impl Args {
    /// Merge the parsed flags into a dispatcher configuration
    ///
    /// Validation is left to the caller so startup can fail with a clear message.
    pub fn into_config(self) -> DispatcherConfig {
        DispatcherConfig {
            ci_url: self.gitlab_url,
            project_id: self.project_id.unwrap_or_default(),
            trigger_token: TriggerToken::new(self.trigger_token.unwrap_or_default()),
            default_ref: self.branch,
            bind_host: self.host,
            bind_port: self.port,
            slack_webhook_url: self.slack_webhook.filter(|url| !url.trim().is_empty()),
            trigger_timeout: Duration::from_secs(self.trigger_timeout),
            notify_timeout: Duration::from_secs(self.notify_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::config::ConfigError;

    #[test]
    fn test_flags_into_config() {
        let args = Args::try_parse_from([
            "drift-receiver",
            "--port",
            "9090",
            "--gitlab-url",
            "https://gitlab.internal",
            "--project-id",
            "55",
            "--trigger-token",
            "glptt-abc",
            "--branch",
            "develop",
        ])
        .unwrap();

        let config = args.into_config();
        assert_eq!(config.bind_port, 9090);
        assert_eq!(config.ci_url, "https://gitlab.internal");
        assert_eq!(config.project_id, "55");
        assert_eq!(config.trigger_token.expose(), "glptt-abc");
        assert_eq!(config.default_ref, "develop");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let args = Args::try_parse_from(["drift-receiver", "--project-id", "55"]).unwrap();
        let mut config = args.into_config();
        // The environment may carry a token; force the flag-only view.
        config.trigger_token = TriggerToken::new("");

        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing("trigger token"))
        );
    }

    #[test]
    fn test_blank_slack_url_is_ignored() {
        let args = Args::try_parse_from([
            "drift-receiver",
            "--project-id",
            "1",
            "--trigger-token",
            "t",
            "--slack-webhook",
            " ",
        ])
        .unwrap();

        assert_eq!(args.into_config().slack_webhook_url, None);
    }
}
