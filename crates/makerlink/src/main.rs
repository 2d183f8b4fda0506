use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use makerlink::Config;
use makerlink::Engine;
use makerlink::Intent;
use makerlink::ReqwestHubClient;
use makerlink::config::LoggingConfig;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(version, about = "Voice intents to Hubitat maker API commands")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "makerlink.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API for the voice host
    Serve,

    /// Handle one intent given as JSON and print the dialogs, one per line
    Intent { json: String },
}

fn init_tracing(logging: &LoggingConfig) {
    let targets = logging
        .overrides
        .iter()
        .fold(Targets::new().with_default(logging.level), |t, (target, level)| {
            t.with_target(target.clone(), *level)
        });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(targets)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)?;
    init_tracing(&config.logging);

    tracing::info!("makerlink starting");
    tracing::info!("Loaded config from: {}", cli.config.display());

    let client = Arc::new(ReqwestHubClient::new()?);
    let engine = Arc::new(Engine::new(client));
    if let Err(e) = engine.apply_config(&config.hub).await {
        tracing::warn!("Starting unconfigured: {}", e);
    }

    match cli.command {
        Command::Serve => {
            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => tracing::info!("Received shutdown signal"),
                    Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
                }
                let _ = shutdown_tx.send(());
            });

            tracing::info!("Press Ctrl+C to exit");
            makerlink::api::serve(config.api.listen, config.api.port, engine, shutdown_rx)
                .await
                .map_err(|e| anyhow::anyhow!("HTTP API server error: {}", e))?;
            tracing::info!("makerlink shutdown complete");
        }
        Command::Intent { json } => {
            let intent: Intent = serde_json::from_str(&json).context("Invalid intent JSON")?;
            for dialog in engine.handle_intent(intent).await {
                println!("{}", serde_json::to_string(&dialog)?);
            }
        }
    }

    Ok(())
}
