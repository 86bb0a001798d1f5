//! Server crate: Axum-based HTTP API for the hedge game.
//!
//! Market events are generated and stored through [`news::EventService`];
//! tickers, games, rounds, round scores and price snapshots pass straight
//! through to the tabular store via the `ledger` crate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      ┌─────────────────┐      ┌────────────────┐
//! │  HTTP client │─────>│  Axum handlers  │─────>│  TableStore    │
//! │              │<─────│  (routes::*)    │<─────│  (PostgREST or │
//! └──────────────┘ JSON │  EventService   │      │   in-memory)   │
//!                       └─────────────────┘      └────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Axum application builder, router and CORS setup
//! - [`state`]: Shared server state (store handle, event service)
//! - [`error`]: Unified error handling with HTTP status codes
//! - [`routes`]: HTTP route handlers

pub mod app;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use app::{ServerConfig, create_app};
pub use error::{AppError, AppResult};
pub use state::ServerState;
