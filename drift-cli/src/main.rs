//! Drift CLI
//!
//! Command-line interface for triggering the retrain pipeline directly and
//! for talking to a running drift webhook receiver.

mod commands;
mod config;

use anyhow::Result;
use clap::{CommandFactory, Parser, error::ErrorKind};
use commands::{Commands, UsageError, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "drift")]
#[command(about = "Drift-triggered CI pipeline dispatcher CLI", long_about = None)]
struct Cli {
    /// Drift webhook receiver URL
    #[arg(
        long,
        global = true,
        env = "DRIFT_RECEIVER_URL",
        default_value = "http://localhost:8080"
    )]
    receiver_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        receiver_url: cli.receiver_url,
    };

    match handle_command(cli.command, &config).await {
        Err(err) => match err.downcast_ref::<UsageError>() {
            Some(usage) => Cli::command()
                .error(ErrorKind::MissingRequiredArgument, usage)
                .exit(),
            None => Err(err),
        },
        ok => ok,
    }
}
