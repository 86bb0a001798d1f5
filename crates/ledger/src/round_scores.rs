//! Round scores: one participant's result for one round.

use store::row::encode;
use store::{Query, TableStore, tables};
use types::{ParticipantId, RoundId, RoundScore, RoundScoreCreate, ScoreId};

use crate::{LedgerResult, decode_row, decode_rows, insert_returning};

const SCORE_FLOATS: &[&str] = &["pnl_delta"];

pub async fn create(store: &dyn TableStore, request: &RoundScoreCreate) -> LedgerResult<RoundScore> {
    let row = encode(request)?;
    insert_returning(store, tables::ROUND_SCORES, row, SCORE_FLOATS).await
}

pub async fn get(store: &dyn TableStore, id: ScoreId) -> LedgerResult<Option<RoundScore>> {
    let query = Query::new().eq("id", id.raw());
    match store.select_one(tables::ROUND_SCORES, query).await? {
        Some(row) => Ok(Some(decode_row(row, SCORE_FLOATS)?)),
        None => Ok(None),
    }
}

/// Scores of a round, best P&L first.
pub async fn by_round(store: &dyn TableStore, round_id: RoundId) -> LedgerResult<Vec<RoundScore>> {
    let query = Query::new()
        .eq("round_id", round_id.raw())
        .order_by("pnl_delta", true);
    let rows = store.select(tables::ROUND_SCORES, &query).await?;
    decode_rows(rows, SCORE_FLOATS)
}

/// Scores of a participant, in round order.
pub async fn by_participant(
    store: &dyn TableStore,
    participant_id: ParticipantId,
) -> LedgerResult<Vec<RoundScore>> {
    let query = Query::new()
        .eq("participant_id", participant_id.raw())
        .order_by("round_id", false);
    let rows = store.select(tables::ROUND_SCORES, &query).await?;
    decode_rows(rows, SCORE_FLOATS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn score(participant: i64, round: i64, pnl: f64) -> RoundScoreCreate {
        RoundScoreCreate {
            participant_id: ParticipantId(participant),
            round_id: RoundId(round),
            pnl_delta: pnl,
            reacted: pnl > 0.0,
            reaction_ms: (pnl > 0.0).then_some(850),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let created = create(&store, &score(7, 1, 12.5)).await.unwrap();
        assert_eq!(created.id, ScoreId(1));
        assert_eq!(created.reaction_ms, Some(850));
        assert!(created.created_at.is_some());

        let fetched = get(&store, created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(get(&store, ScoreId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_queries_are_ordered() {
        let store = MemoryStore::new();
        create(&store, &score(1, 1, -5.0)).await.unwrap();
        create(&store, &score(2, 1, 30.0)).await.unwrap();
        create(&store, &score(1, 3, 4.0)).await.unwrap();
        create(&store, &score(1, 2, 1.0)).await.unwrap();

        let round_one = by_round(&store, RoundId(1)).await.unwrap();
        let pnls: Vec<f64> = round_one.iter().map(|s| s.pnl_delta).collect();
        assert_eq!(pnls, vec![30.0, -5.0]);

        let participant = by_participant(&store, ParticipantId(1)).await.unwrap();
        let rounds: Vec<i64> = participant.iter().map(|s| s.round_id.raw()).collect();
        assert_eq!(rounds, vec![1, 2, 3]);
    }
}
