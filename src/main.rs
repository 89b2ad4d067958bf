//! CosmoLab Matrix Dashboard Backend
//!
//! REST backend for the matrix referral token-sale dashboard: level purchase
//! checking and confirmation over PostgreSQL.

#![allow(dead_code)]

mod api;
mod client;
mod config;
mod database;
mod error;
mod models;
mod services;
mod store;
mod wallet;

use anyhow::Result;
use clap::Parser;
use config::MatrixConfig;
use services::LevelService;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cosmo-matrix")]
#[command(about = "CosmoLab Matrix Dashboard Backend")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "matrix.toml")]
    config: String,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,

    /// Dry run mode (validate config and exit)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if std::path::Path::new(&cli.config).exists() {
        MatrixConfig::from_file(&cli.config)?
    } else {
        warn!("Config file not found, using defaults: {}", cli.config);
        MatrixConfig::default()
    };

    // Override log level if provided
    if let Some(log_level) = cli.log_level {
        config.monitoring.log_level = log_level;
    }

    // Initialize logging
    init_logging(&config);

    info!("Starting CosmoLab Matrix backend");
    info!("API bind address: {}", config.api.bind_address);

    config.validate()?;
    info!("Configuration validated successfully");

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        return Ok(());
    }

    // Connect to PostgreSQL and run pending migrations
    info!("Connecting to database...");
    let db = database::Database::connect(&config.database).await?;
    info!("Database connection established");

    let service = Arc::new(LevelService::new(Arc::new(db)));

    // Start API server
    info!("Starting API server on {}", config.api.bind_address);
    let api_server = api::start_server(service, &config.api).await?;

    info!("Backend started successfully. Press Ctrl+C to shutdown.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        _ = api_server => {
            info!("API server finished");
        }
    }

    info!("Shutting down CosmoLab Matrix backend");
    Ok(())
}

fn init_logging(config: &MatrixConfig) {
    let log_level = config
        .monitoring
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cosmo_matrix={},tower_http=info", log_level).into());

    if config.monitoring.structured_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
