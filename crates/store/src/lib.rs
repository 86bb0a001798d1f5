//! Tabular store client for the hedge game.
//!
//! The API never talks to a database driver directly. It goes through the
//! [`TableStore`] trait: insert / select / update / delete against a named
//! table with equality and inclusion filters, one sort column and a limit.
//!
//! # Backends
//!
//! - [`PostgrestStore`]: the hosted backend over HTTPS (PostgREST dialect)
//! - [`MemoryStore`]: in-process tables for tests and local development
//!
//! Rows are untyped JSON objects ([`Row`]); typed decoding lives with the
//! callers (see [`row`]).

pub mod memory;
pub mod postgrest;
pub mod query;
pub mod row;
pub mod table_store;

pub use memory::MemoryStore;
pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use query::{Filter, Order, Query};
pub use row::Row;
pub use table_store::TableStore;

use thiserror::Error;

/// Table names used by the API.
pub mod tables {
    pub const EVENTS: &str = "events";
    pub const TICKERS: &str = "tickers";
    pub const GAMES: &str = "games";
    pub const ROUNDS: &str = "rounds";
    pub const ROUND_SCORES: &str = "round_scores";
    pub const PRICE_SNAPSHOTS: &str = "price_snapshots";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cannot decode row: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the store rejected the write as a duplicate key.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Api { status: 409, .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
