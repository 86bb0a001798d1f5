//! Hedge Game Events API - Main binary
//!
//! Serves market event generation plus the game's pass-through entities
//! over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────────┐    ┌─────────────────────┐
//! │  .env + CLI  │───>│  AppConfig           │───>│  TableStore         │
//! │  (clap, env) │    │  (validated)         │    │  PostgREST / memory │
//! └──────────────┘    └──────────────────────┘    └──────────┬──────────┘
//!                                                            │
//!                     ┌──────────────────────┐    ┌──────────▼──────────┐
//!                     │  axum::serve         │<───│  ServerState        │
//!                     │  (TcpListener)       │    │  (EventService)     │
//!                     └──────────────────────┘    └─────────────────────┘
//! ```
//!
//! Run `--in-memory` to start without store credentials (local development).

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use news::{EventGenerator, EventService, TemplateCatalog};
use server::{ServerState, create_app};
use store::{MemoryStore, PostgrestStore, TableStore};

use config::{AppConfig, Args, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_args(&args)?;

    let store: Arc<dyn TableStore> = match &config.store {
        StoreBackend::Postgrest(store_config) => {
            info!(url = %store_config.url, timeout_secs = store_config.timeout_secs, "Using hosted store");
            Arc::new(PostgrestStore::new(store_config.clone()).context("failed to build store client")?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = TemplateCatalog::builtin();
    info!(templates = catalog.len(), schema = %config.schema, "Loaded event templates");
    let generator = match config.seed {
        Some(seed) => EventGenerator::with_seed(catalog, config.generator.clone(), seed),
        None => EventGenerator::new(catalog, config.generator.clone()),
    };
    let events = EventService::new(store.clone(), generator, config.schema);

    let state = ServerState::new(store, events);
    let app = create_app(state, &config.server);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
