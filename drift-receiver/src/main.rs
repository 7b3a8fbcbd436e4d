//! Drift Webhook Receiver
//!
//! Long-running HTTP server that accepts drift notifications and triggers
//! the retrain pipeline on the CI system.
//!
//! Architecture:
//! - Configuration: flags over environment over defaults, validated before binding
//! - API: routing, payload rejection, error-to-status mapping
//! - Services: event validation and trigger dispatch

use anyhow::{Context, Result};
use clap::Parser;
use drift_client::{NotificationSink, SlackNotifier, TriggerClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;
mod shutdown;

use crate::config::Args;
use crate::service::DispatchService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "drift_receiver=debug,drift_client=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting drift webhook receiver...");

    // Resolve configuration once; refuse to serve without credentials
    let config = Args::parse().into_config();
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        tracing::error!(
            "Set GITLAB_PROJECT_ID and GITLAB_TRIGGER_TOKEN (or pass --project-id / --trigger-token)"
        );
        return Err(e).context("Invalid receiver configuration");
    }

    tracing::info!("GitLab URL: {}", config.ci_url);
    tracing::info!("Project ID: {}", config.project_id);
    tracing::info!("Branch: {}", config.default_ref);

    let trigger =
        TriggerClient::new(config.trigger_timeout).context("Failed to build trigger client")?;

    let notifier: Option<Arc<dyn NotificationSink>> = match &config.slack_webhook_url {
        Some(url) => {
            tracing::info!("Outcome notifications enabled");
            let sink: Arc<dyn NotificationSink> = Arc::new(
                SlackNotifier::new(url.clone(), config.notify_timeout)
                    .context("Failed to build notification client")?,
            );
            Some(sink)
        }
        None => None,
    };

    let addr = config.bind_addr();
    let service = Arc::new(DispatchService::new(
        Arc::new(config),
        Arc::new(trigger),
        notifier,
    ));

    // Build router with all API endpoints
    let app = api::create_router(service);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .context("Webhook server failed")?;

    tracing::info!("Webhook server stopped");
    Ok(())
}
