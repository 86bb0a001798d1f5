//! Core types for the hedge game API.
//!
//! This crate provides the wire-level data types shared across the
//! workspace: market events, the pass-through game entities (tickers,
//! games, rounds, round scores, price snapshots), request bodies and the
//! `{success, ...}` response envelopes.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod api;
pub mod entities;
pub mod events;

pub use api::*;
pub use entities::{
    Game, GameCreate, PriceSnapshot, PriceSnapshotBatchCreate, PriceSnapshotCreate, Round,
    RoundCreate, RoundScore, RoundScoreCreate, Ticker, TickerCreate,
};
pub use events::{EventCategory, EventCreate, EventUpdate, MarketEvent};

// =============================================================================
// Time Types
// =============================================================================

/// Wall clock timestamp in milliseconds since epoch.
pub type Timestamp = i64;

/// Current wall clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// Current wall clock time as an ISO-8601 string (UTC).
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

// =============================================================================
// Row Identifiers (Newtypes for type safety)
// =============================================================================

/// Declares an opaque store-assigned row identifier.
///
/// Serializes as the bare integer so wire and storage formats stay flat.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw integer value.
            #[inline]
            pub fn raw(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a row in the `tickers` table.
    TickerId,
    "Ticker"
);
row_id!(
    /// Identifier of a row in the `games` table.
    GameId,
    "Game"
);
row_id!(
    /// Identifier of a row in the `rounds` table.
    RoundId,
    "Round"
);
row_id!(
    /// Identifier of a game participant.
    ParticipantId,
    "Participant"
);
row_id!(
    /// Identifier of a row in the `round_scores` table.
    ScoreId,
    "Score"
);
row_id!(
    /// Identifier of a row in the `price_snapshots` table.
    SnapshotId,
    "Snapshot"
);

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_serializes_flat() {
        let id = GameId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: RoundId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, RoundId(7));
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(TickerId(3).to_string(), "Ticker(3)");
        assert_eq!(SnapshotId(9).to_string(), "Snapshot(9)");
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000);
    }
}
