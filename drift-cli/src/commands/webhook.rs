//! Webhook command handlers
//!
//! Operator helpers for a running drift webhook receiver.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use drift_client::ReceiverClient;
use drift_core::domain::drift::DriftEvent;
use drift_core::dto::webhook::DispatchStatus;

use crate::config::Config;

/// Webhook subcommands
#[derive(Subcommand)]
pub enum WebhookCommands {
    /// Check that the receiver is up
    Health,
    /// Send a drift event, as the detector would
    Send {
        /// Report that no drift was found (the receiver should skip)
        #[arg(long)]
        no_drift: bool,

        /// p-value to include in the payload
        #[arg(long)]
        p_val: Option<f64>,
    },
}

/// Handle webhook commands
pub async fn handle_webhook_command(command: WebhookCommands, config: &Config) -> Result<()> {
    let client = ReceiverClient::new(&config.receiver_url);

    match command {
        WebhookCommands::Health => check_health(&client).await,
        WebhookCommands::Send { no_drift, p_val } => send_drift(&client, !no_drift, p_val).await,
    }
}

async fn check_health(client: &ReceiverClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Receiver at {} is not healthy", client.base_url()))?;

    println!(
        "{} {} ({})",
        "✓".green().bold(),
        client.base_url(),
        health.status.green()
    );
    Ok(())
}

async fn send_drift(client: &ReceiverClient, is_drift: bool, p_val: Option<f64>) -> Result<()> {
    let event = DriftEvent::drift(is_drift, p_val);
    let response = client
        .send_drift(&event)
        .await
        .context("Receiver did not accept the drift event")?;

    match response.status {
        DispatchStatus::Triggered => {
            println!("{}", "✓ Retrain pipeline triggered".green().bold());
            if let Some(id) = response.pipeline_id {
                println!("  Pipeline ID:  {}", id.to_string().cyan());
            }
            if let Some(url) = response.pipeline_url {
                println!("  Pipeline URL: {}", url);
            }
        }
        DispatchStatus::Skipped => {
            println!("{}", "No drift reported, pipeline not triggered.".yellow());
        }
    }

    Ok(())
}
