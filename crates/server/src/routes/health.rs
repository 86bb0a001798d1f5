//! Service endpoints.
//!
//! # Endpoints
//!
//! - `GET /` - API name, version and endpoint list
//! - `GET /health` - Liveness plus a store connectivity probe
//! - `GET /favicon.ico` - 204, keeps browsers from logging 404s

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::state::ServerState;

pub const API_NAME: &str = "Hedge Game Events API";
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoints advertised by `GET /`.
const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /api/events",
    "POST /api/events",
    "GET /api/events/blackswan",
    "GET /api/events/news",
    "GET|PUT|DELETE /api/events/{id}",
    "GET|POST /api/tickers",
    "GET /api/tickers/{id}",
    "GET /api/tickers/symbol/{symbol}",
    "GET|POST /api/games",
    "GET /api/games/{id}",
    "GET|POST /api/games/rounds",
    "GET /api/games/rounds/{id}",
    "PUT /api/games/rounds/{id}/end",
    "GET|POST /api/round-scores",
    "GET /api/round-scores/{id}",
    "GET|POST /api/price-snapshots",
    "POST /api/price-snapshots/batch",
];

/// API info response.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: &'static str,
    /// `connected` when the store answered the probe.
    pub database: &'static str,
    /// Store backend name.
    pub backend: &'static str,
    pub version: &'static str,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// `GET /`
pub async fn root() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: API_NAME,
        version: API_VERSION,
        endpoints: ENDPOINTS,
    })
}

/// `GET /health`
///
/// Always 200; the store's reachability is reported in `database`.
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "Health probe could not reach the store");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "healthy",
        database,
        backend: state.store.backend(),
        version: API_VERSION,
        uptime_secs: state.uptime_secs(),
    })
}

/// `GET /favicon.ico`
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            database: "connected",
            backend: "memory",
            version: API_VERSION,
            uptime_secs: 60,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"database\":\"connected\""));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let Json(info) = root().await;
        assert_eq!(info.name, API_NAME);
        assert!(info.endpoints.contains(&"POST /api/events"));
    }
}
