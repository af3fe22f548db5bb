//! # sweeper-server
//!
//! HTTP server for sweeper: upload CSV or Excel files, clean them and
//! download the result.

mod config;
mod error;
mod routes;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use routes::{create_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::parse();
    let addr = config.addr;
    let state = AppState::new(config);
    state.sessions.spawn_eviction();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("sweeper-server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
