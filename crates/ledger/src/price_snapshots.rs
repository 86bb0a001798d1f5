//! Price snapshots: ticker prices captured during a round.
//!
//! All queries return snapshots in capture order (`taken_at` ascending).

use store::row::encode;
use store::{Query, Row, TableStore, tables};
use types::{GameId, PriceSnapshot, PriceSnapshotCreate, RoundId, TickerId};

use crate::{LedgerError, LedgerResult, MAX_BATCH, decode_rows, insert_returning};

const SNAPSHOT_FLOATS: &[&str] = &["price"];

/// Filter for [`query`]. Which fields are set selects the lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    pub game_id: Option<GameId>,
    pub round_id: Option<RoundId>,
    pub ticker_id: Option<TickerId>,
    pub limit: Option<usize>,
}

pub async fn create(store: &dyn TableStore, request: &PriceSnapshotCreate) -> LedgerResult<PriceSnapshot> {
    let row = encode(request)?;
    insert_returning(store, tables::PRICE_SNAPSHOTS, row, SNAPSHOT_FLOATS).await
}

/// Insert 1..=1000 snapshots in one store call.
pub async fn create_batch(
    store: &dyn TableStore,
    snapshots: &[PriceSnapshotCreate],
) -> LedgerResult<Vec<PriceSnapshot>> {
    if snapshots.is_empty() || snapshots.len() > MAX_BATCH {
        return Err(LedgerError::Validation(format!(
            "snapshots must contain between 1 and {MAX_BATCH} items, got {}",
            snapshots.len()
        )));
    }
    let rows = snapshots
        .iter()
        .map(encode)
        .collect::<Result<Vec<Row>, _>>()?;
    let stored = store.insert(tables::PRICE_SNAPSHOTS, rows).await?;
    decode_rows(stored, SNAPSHOT_FLOATS)
}

/// Snapshots matching `filter`:
///
/// - ticker + game: that ticker's history in the game (optionally one round, limited)
/// - otherwise round: every snapshot of the round
/// - otherwise game: every snapshot of the game
///
/// Anything else is a validation error.
pub async fn query(store: &dyn TableStore, filter: &SnapshotFilter) -> LedgerResult<Vec<PriceSnapshot>> {
    let query = match (filter.ticker_id, filter.game_id, filter.round_id) {
        (Some(ticker_id), Some(game_id), round_id) => {
            let mut query = Query::new()
                .eq("ticker_id", ticker_id.raw())
                .eq("game_id", game_id.raw());
            if let Some(round_id) = round_id {
                query = query.eq("round_id", round_id.raw());
            }
            query.maybe_limit(filter.limit)
        }
        (_, _, Some(round_id)) => Query::new().eq("round_id", round_id.raw()),
        (_, Some(game_id), None) => Query::new().eq("game_id", game_id.raw()),
        (_, None, None) => {
            return Err(LedgerError::Validation(
                "Must provide at least game_id or round_id".into(),
            ));
        }
    };

    let rows = store
        .select(tables::PRICE_SNAPSHOTS, &query.order_by("taken_at", false))
        .await?;
    decode_rows(rows, SNAPSHOT_FLOATS)
}
