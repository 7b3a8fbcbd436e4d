//! Trigger command handler
//!
//! Submits one trigger request straight to the CI API, without a receiver.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use drift_client::{PipelineTrigger, TriggerClient, TriggerError};
use drift_core::config::{
    ConfigError, DEFAULT_CI_URL, DEFAULT_REF, DEFAULT_TRIGGER_TIMEOUT_SECS, DispatcherConfig,
};
use drift_core::domain::trigger::{TriggerToken, TriggerVariables};
use std::time::Duration;

use super::UsageError;

/// Flags for a direct pipeline trigger
#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// CI base URL
    #[arg(short = 'u', long = "url", env = "GITLAB_URL", default_value = DEFAULT_CI_URL)]
    pub url: String,

    /// CI project id (required)
    #[arg(short, long, env = "GITLAB_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Pipeline trigger token (required)
    #[arg(short, long, env = "GITLAB_TRIGGER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Branch or tag to run the pipeline on
    #[arg(
        short = 'r',
        long = "ref",
        visible_alias = "branch",
        short_alias = 'b',
        env = "GITLAB_BRANCH",
        default_value = DEFAULT_REF
    )]
    pub git_ref: String,

    /// Enable the retrain stage (TRIGGER_RETRAIN=true)
    #[arg(long)]
    pub retrain: bool,

    /// Mark the run as drift-triggered (DRIFT_DETECTED=true)
    #[arg(long)]
    pub drift: bool,

    /// Slack webhook the pipeline should notify (SLACK_WEBHOOK_URL)
    #[arg(short, long = "slack-webhook", env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook: Option<String>,

    /// Extra pipeline variables as KEY=value pairs
    #[arg(long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Request deadline in seconds
    #[arg(long, env = "TRIGGER_TIMEOUT_SECS", default_value_t = DEFAULT_TRIGGER_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl TriggerArgs {
    fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            ci_url: self.url.clone(),
            project_id: self.project_id.clone().unwrap_or_default(),
            trigger_token: TriggerToken::new(self.token.clone().unwrap_or_default()),
            default_ref: self.git_ref.clone(),
            trigger_timeout: Duration::from_secs(self.timeout),
            ..DispatcherConfig::default()
        }
    }

    fn variables(&self) -> TriggerVariables {
        let mut variables = TriggerVariables::new()
            .retrain(self.retrain)
            .drift_detected(self.drift)
            .slack_webhook_url(self.slack_webhook.as_deref());
        for (name, value) in &self.vars {
            variables.insert(name.clone(), value.clone());
        }
        variables
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Handle the trigger command
pub async fn handle_trigger_command(args: TriggerArgs) -> Result<()> {
    let config = args.dispatcher_config();
    match config.validate() {
        Ok(()) => {}
        Err(ConfigError::Missing(name)) => {
            return Err(UsageError(format!(
                "missing required {} (see --help for the flag and environment variable)",
                name
            ))
            .into());
        }
        Err(e) => return Err(e.into()),
    }

    let request = config.trigger_request(args.variables());
    let client = TriggerClient::new(config.trigger_timeout)?;

    println!(
        "{} project {} on {}",
        "▸ Triggering pipeline for".bold(),
        config.project_id.cyan(),
        request.git_ref.cyan()
    );
    for name in request.variables.names() {
        println!("    {}", name.dimmed());
    }

    match client.submit(&request).await {
        Ok(result) => {
            println!("{}", "✓ Pipeline triggered successfully!".green().bold());
            match result.pipeline_id {
                Some(id) => println!("  Pipeline ID:  {}", id.to_string().cyan()),
                None => println!("  Pipeline ID:  {}", "unknown".yellow()),
            }
            if let Some(url) = &result.pipeline_url {
                println!("  Pipeline URL: {}", url);
            }
            Ok(())
        }
        Err(TriggerError::RemoteRejected { status, body }) => {
            println!("{}", "✗ Pipeline trigger failed".red().bold());
            println!("  HTTP status: {}", status.to_string().red());
            println!("  Response:    {}", body.dimmed());
            anyhow::bail!("CI rejected the trigger with HTTP {}", status)
        }
        Err(err @ TriggerError::Transport(_)) => {
            Err(err).with_context(|| format!("Could not reach {}", config.ci_url))
        }
        Err(err) => Err(err.into()),
    }
}
