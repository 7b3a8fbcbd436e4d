//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod trigger;
mod webhook;

pub use trigger::TriggerArgs;
pub use webhook::WebhookCommands;

use anyhow::Result;
use clap::Subcommand;
use std::fmt;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Trigger the pipeline directly (manual or scripted retrain)
    Trigger(TriggerArgs),
    /// Talk to a running drift webhook receiver
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
}

/// Required input missing; reported as a usage error before any network activity
#[derive(Debug)]
pub struct UsageError(pub String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UsageError {}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Trigger(args) => trigger::handle_trigger_command(args).await,
        Commands::Webhook { command } => webhook::handle_webhook_command(command, config).await,
    }
}
