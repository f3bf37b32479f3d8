//! Borealis Survey service binary.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (0.0.0.0:8080, ./data/survey_db)
//! cargo run --release
//!
//! # Override bind address and data directory
//! cargo run --release -- --addr 127.0.0.1:9090 --data-dir /var/lib/borealis
//! ```
//!
//! # Environment Variables
//!
//! - `BOREALIS_CONFIG`: Path to a TOML config file
//! - `BOREALIS_CORS_ORIGINS`: Comma-separated allowed CORS origins (dev only)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use borealis_survey::api::{create_app, ApiState};
use borealis_survey::config::SurveyConfig;
use borealis_survey::pipeline::SurveyPipeline;
use borealis_survey::storage::SurveyStore;

#[derive(Parser, Debug)]
#[command(name = "borealis-survey")]
#[command(about = "Borealis directional-drilling survey service")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the sled data directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let mut config = SurveyConfig::load();
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.into();
    }

    let store = SurveyStore::open(&config.storage.data_dir)
        .with_context(|| format!("opening survey db at {}", config.storage.data_dir.display()))?;
    let pipeline = Arc::new(SurveyPipeline::new(
        store.clone(),
        config.verification.mag_model_max_age_days,
    ));

    let app = create_app(ApiState { store, pipeline });

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("binding {}", config.server.addr))?;
    info!(addr = %config.server.addr, "Borealis Survey listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
}
