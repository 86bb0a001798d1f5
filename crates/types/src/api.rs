//! Response envelopes for the HTTP API.
//!
//! Every endpoint answers with `{success, <entity>, message?}` or
//! `{success, <entities>, count}`.

use serde::{Deserialize, Serialize};

use crate::entities::{Game, PriceSnapshot, Round, RoundScore, Ticker};
use crate::events::MarketEvent;

/// Declares a single-entity envelope `{success, <field>, message?}`.
macro_rules! entity_envelope {
    ($(#[$meta:meta])* $name:ident, $field:ident: $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub success: bool,
            pub $field: $ty,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub message: Option<String>,
        }

        impl $name {
            /// Successful response with a message.
            pub fn ok($field: $ty, message: impl Into<String>) -> Self {
                Self {
                    success: true,
                    $field,
                    message: Some(message.into()),
                }
            }
        }
    };
}

/// Declares a list envelope `{success, <field>, count}`.
macro_rules! list_envelope {
    ($(#[$meta:meta])* $name:ident, $field:ident: $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub success: bool,
            pub $field: Vec<$ty>,
            pub count: usize,
        }

        impl From<Vec<$ty>> for $name {
            fn from($field: Vec<$ty>) -> Self {
                Self {
                    success: true,
                    count: $field.len(),
                    $field,
                }
            }
        }
    };
}

entity_envelope!(
    /// Single event response.
    EventResponse,
    event: MarketEvent
);
list_envelope!(
    /// Event list response.
    EventsListResponse,
    events: MarketEvent
);

entity_envelope!(TickerResponse, ticker: Ticker);
list_envelope!(TickersListResponse, tickers: Ticker);

entity_envelope!(GameResponse, game: Game);
list_envelope!(GamesListResponse, games: Game);

entity_envelope!(RoundResponse, round: Round);
list_envelope!(RoundsListResponse, rounds: Round);

entity_envelope!(RoundScoreResponse, score: RoundScore);
list_envelope!(RoundScoresListResponse, scores: RoundScore);

entity_envelope!(PriceSnapshotResponse, snapshot: PriceSnapshot);
list_envelope!(PriceSnapshotsListResponse, snapshots: PriceSnapshot);

/// Response carrying only a message (e.g. after a delete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error body returned with every 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TickerId;

    #[test]
    fn test_entity_envelope_shape() {
        let ticker = Ticker {
            id: TickerId(1),
            symbol: "ACME".into(),
            name: "Acme Corp".into(),
            sector: "Industrials".into(),
            created_at: None,
        };
        let json = serde_json::to_value(TickerResponse::ok(ticker, "Ticker retrieved")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["ticker"]["symbol"], "ACME");
        assert_eq!(json["message"], "Ticker retrieved");
    }

    #[test]
    fn test_list_envelope_counts() {
        let response = TickersListResponse::from(Vec::new());
        assert!(response.success);
        assert_eq!(response.count, 0);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"tickers\":[]"));
    }

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new(404, "Event with id 'x' not found");
        let json = serde_json::to_value(err).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], 404);
    }
}
