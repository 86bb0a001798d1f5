//! Axum application builder.
//!
//! Configures routes, middleware, and state for the server.
//!
//! # Routes
//!
//! - `GET /`, `GET /health`, `GET /favicon.ico`
//! - `/api/events`: generate, list, black swans, news, get/update/delete by id
//! - `/api/tickers`: list, create, by id, by symbol
//! - `/api/games`: list, create-or-get, by id; rounds under `/api/games/rounds`
//! - `/api/round-scores`: create, query, by id
//! - `/api/price-snapshots`: create, batch create, query

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::routes::{events, games, health, price_snapshots, round_scores, tickers};
use crate::state::ServerState;

/// Origins allowed when none are configured.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

/// Create the Axum application with all routes.
pub fn create_app(state: ServerState, config: &ServerConfig) -> Router {
    Router::new()
        // Service endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/favicon.ico", get(health::favicon))
        // Events
        .route("/api/events", get(events::list_events).post(events::create_event))
        .route("/api/events/blackswan", get(events::list_black_swans))
        .route("/api/events/news", get(events::list_news))
        .route(
            "/api/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Tickers
        .route("/api/tickers", get(tickers::list_tickers).post(tickers::create_ticker))
        .route("/api/tickers/{id}", get(tickers::get_ticker))
        .route("/api/tickers/symbol/{symbol}", get(tickers::get_ticker_by_symbol))
        // Games and rounds
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route("/api/games/{id}", get(games::get_game))
        .route("/api/games/rounds", get(games::list_rounds).post(games::create_round))
        .route("/api/games/rounds/{id}", get(games::get_round))
        .route("/api/games/rounds/{id}/end", put(games::end_round))
        // Round scores
        .route(
            "/api/round-scores",
            get(round_scores::list_scores).post(round_scores::create_score),
        )
        .route("/api/round-scores/{id}", get(round_scores::get_score))
        // Price snapshots
        .route(
            "/api/price-snapshots",
            get(price_snapshots::list_snapshots).post(price_snapshots::create_snapshot),
        )
        .route(
            "/api/price-snapshots/batch",
            post(price_snapshots::create_snapshot_batch),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        // State
        .with_state(state)
}

/// CORS layer for the configured origins. `*` allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().max_age(Duration::from_secs(3600));

    if origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials forbid wildcards, so methods and headers echo the preflight.
    base.allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".into(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Parse a comma-separated origin list, dropping blanks.
    pub fn parse_origins(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Get bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.cors_origins.len(), 4);
    }

    #[test]
    fn test_parse_origins() {
        let origins = ServerConfig::parse_origins(" http://a.test , ,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
        assert!(ServerConfig::parse_origins("").is_empty());
    }
}
