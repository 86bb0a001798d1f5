//! Pass-through game entities.
//!
//! These mirror the store's table rows one-to-one (snake_case on the wire,
//! like the tables themselves). Timestamps are kept as the ISO-8601 strings
//! the store hands back.

use serde::{Deserialize, Serialize};

use crate::{GameId, ParticipantId, RoundId, ScoreId, SnapshotId, TickerId};

// =============================================================================
// Tickers
// =============================================================================

/// A tradable instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub id: TickerId,
    pub symbol: String,
    pub name: String,
    pub sector: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /api/tickers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerCreate {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

// =============================================================================
// Games and Rounds
// =============================================================================

/// Default starting cash for a new game.
pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;

/// Default status for a new game.
pub const DEFAULT_GAME_STATUS: &str = "active";

/// A game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(default)]
    pub code: Option<String>,
    pub starting_cash: f64,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /api/games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCreate {
    /// Join code for multiplayer games.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for GameCreate {
    fn default() -> Self {
        Self {
            code: None,
            starting_cash: DEFAULT_STARTING_CASH,
            status: DEFAULT_GAME_STATUS.to_string(),
        }
    }
}

fn default_starting_cash() -> f64 {
    DEFAULT_STARTING_CASH
}

fn default_status() -> String {
    DEFAULT_GAME_STATUS.to_string()
}

/// A round within a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub game_id: GameId,
    pub round_no: i64,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
}

impl Round {
    /// Whether the round has been ended.
    pub fn is_ended(&self) -> bool {
        self.ends_at.is_some()
    }
}

/// Body of `POST /api/games/rounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundCreate {
    pub game_id: GameId,
    pub round_no: i64,
}

// =============================================================================
// Round Scores
// =============================================================================

/// A participant's result for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub id: ScoreId,
    pub participant_id: ParticipantId,
    pub round_id: RoundId,
    pub pnl_delta: f64,
    pub reacted: bool,
    #[serde(default)]
    pub reaction_ms: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /api/round-scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScoreCreate {
    pub participant_id: ParticipantId,
    pub round_id: RoundId,
    pub pnl_delta: f64,
    pub reacted: bool,
    #[serde(default)]
    pub reaction_ms: Option<i64>,
}

// =============================================================================
// Price Snapshots
// =============================================================================

/// A ticker price captured during a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub id: SnapshotId,
    pub game_id: GameId,
    pub round_id: RoundId,
    pub ticker_id: TickerId,
    pub price: f64,
    #[serde(default)]
    pub taken_at: Option<String>,
}

/// Body of `POST /api/price-snapshots` (and each item of a batch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshotCreate {
    pub game_id: GameId,
    pub round_id: RoundId,
    pub ticker_id: TickerId,
    pub price: f64,
}

/// Body of `POST /api/price-snapshots/batch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshotBatchCreate {
    pub snapshots: Vec<PriceSnapshotCreate>,
}
