//! Webhook Inspector server
//!
//! Captures every request sent to `/capture/*` and serves the inspection API
//! and viewer UI.

mod config;
mod seed;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webhook_inspector_api::{ApiServer, ApiServerConfig};
use webhook_inspector_db::WebhookStore;

use crate::config::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    init_logging(&config)?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    info!(environment = %config.environment, "Starting webhook inspector");
    info!("Connecting to database: {}", config.redacted_database_url());

    let db = webhook_inspector_db::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    webhook_inspector_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    let store = WebhookStore::new(db);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config, store.clone()).await,
        Commands::Seed { count } => seed::run(&store, count).await,
    };

    if let Err(e) = store.close().await {
        error!("Failed to close database connection: {}", e);
    }
    info!("Database connection closed");

    result
}

async fn serve(config: &Config, store: WebhookStore) -> Result<()> {
    let api_config = ApiServerConfig {
        bind_addr: config.bind_addr(),
        enable_cors: true,
        environment: config.environment.to_string(),
        max_body_bytes: config.max_body_bytes,
    };

    ApiServer::new(api_config, store)
        .start(shutdown_signal())
        .await?;

    info!("Webhook inspector stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Error listening for shutdown signal: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Error listening for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

fn init_logging(config: &Config) -> Result<()> {
    // Keep per-query SQL logs out of the default output
    let directives = format!("{},sqlx=warn", config.log_level());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(directives))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}
