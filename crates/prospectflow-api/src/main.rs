//! ProspectFlow server
//!
//! Serves the pipeline API over HTTP

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use prospectflow_api::{router, AppState, Overrides, ServerConfig};
use prospectflow_core::logging_facility::{self, Profile};
use prospectflow_core::{EntityStore, MemoryStore};
use prospectflow_store::SqliteStore;

#[derive(Debug, Parser)]
#[command(name = "prospectflow")]
#[command(about = "ProspectFlow - Prospect to client pipeline server", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./prospectflow.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database file
    #[arg(long, conflicts_with = "in_memory")]
    database: Option<PathBuf>,

    /// Keep all data in memory
    #[arg(long)]
    in_memory: bool,

    /// development, production or test
    #[arg(long)]
    log_profile: Option<Profile>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .apply(Overrides {
            bind: cli.bind,
            database_path: cli.database,
            in_memory: cli.in_memory,
            log_profile: cli.log_profile,
        });

    logging_facility::init_with_filter(config.log_profile, config.log_filter.as_deref());

    let store = open_store(&config)?;
    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "prospectflow listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("prospectflow stopped");
    Ok(())
}

fn open_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn EntityStore>> {
    match &config.database_path {
        Some(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            tracing::info!(database = %path.display(), "using sqlite store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
