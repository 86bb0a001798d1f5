//! Route handlers for the server.
//!
//! # Modules
//!
//! - [`health`]: API info, health probe, favicon
//! - [`events`]: market event generation and CRUD
//! - [`tickers`]: tradable instruments
//! - [`games`]: games and rounds
//! - [`round_scores`]: per-participant round results
//! - [`price_snapshots`]: ticker prices captured during play

pub mod events;
pub mod games;
pub mod health;
pub mod price_snapshots;
pub mod round_scores;
pub mod tickers;

use crate::error::{AppError, AppResult};

/// Largest `limit` a list endpoint accepts.
pub const MAX_LIMIT: usize = 1000;

/// Reject a `limit` outside `1..=MAX_LIMIT`.
pub(crate) fn check_limit(limit: Option<usize>) -> AppResult<Option<usize>> {
    match limit {
        Some(n) if n == 0 || n > MAX_LIMIT => Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        ))),
        other => Ok(other),
    }
}
