//! Startup configuration for the API server.
//!
//! Every setting is a CLI flag with an environment fallback; `.env` is
//! loaded before parsing. [`AppConfig::from_args`] turns the raw flags into
//! validated settings, failing when no store credentials are given outside
//! in-memory mode.

use anyhow::{Context, bail};
use clap::Parser;

use news::{GeneratorConfig, SchemaProfile};
use server::ServerConfig;
use server::app::DEFAULT_CORS_ORIGINS;
use store::PostgrestConfig;

/// Hedge Game Events API
#[derive(Parser, Debug, Clone)]
#[command(name = "hedge-game")]
#[command(about = "REST API for market events, tickers, games, round scores and price snapshots")]
#[command(version)]
pub struct Args {
    /// Store endpoint (project URL)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Store access key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Comma-separated allowed origins ("*" allows any)
    #[arg(long, env = "CORS_ORIGINS")]
    pub cors_origins: Option<String>,

    /// Column layout of the events table: current, legacy or compat
    #[arg(long, env = "EVENTS_SCHEMA", default_value = "current")]
    pub events_schema: SchemaProfile,

    /// Number of recent events whose templates are not repeated
    #[arg(long, env = "EVENT_LOOKBACK", default_value_t = 20)]
    pub event_lookback: usize,

    /// Store request timeout in seconds
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 30)]
    pub store_timeout_secs: u64,

    /// Seed for the event generator (entropy when absent)
    #[arg(long, env = "EVENT_SEED")]
    pub seed: Option<u64>,

    /// Keep all tables in process memory instead of the hosted store
    #[arg(long)]
    pub in_memory: bool,
}

/// Which store backend to start.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Postgrest(PostgrestConfig),
    Memory,
}

/// Validated startup settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreBackend,
    pub schema: SchemaProfile,
    pub generator: GeneratorConfig,
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let store = if args.in_memory {
            StoreBackend::Memory
        } else {
            let url = non_blank(args.supabase_url.as_deref());
            let key = non_blank(args.supabase_key.as_deref());
            let (Some(url), Some(key)) = (url, key) else {
                bail!("SUPABASE_URL and SUPABASE_KEY must be set (or pass --in-memory)");
            };
            let config = PostgrestConfig::new(url, key).with_timeout_secs(args.store_timeout_secs);
            config.validate().context("invalid store configuration")?;
            StoreBackend::Postgrest(config)
        };

        let cors_origins = match args.cors_origins.as_deref() {
            Some(raw) => ServerConfig::parse_origins(raw),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            server: ServerConfig {
                port: args.port,
                host: args.host.clone(),
                cors_origins,
            },
            store,
            schema: args.events_schema,
            generator: GeneratorConfig::default().with_lookback(args.event_lookback),
            seed: args.seed,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
