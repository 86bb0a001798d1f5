//! Games and rounds.
//!
//! Both use create-or-get semantics: posting a game with the code of an
//! active game returns that game, and posting an existing
//! `(game_id, round_no)` returns the existing round.

use tracing::info;

use store::row::encode;
use store::{Filter, Query, Row, TableStore, tables};
use types::{Game, GameCreate, GameId, Round, RoundCreate, RoundId};

use crate::{LedgerError, LedgerResult, decode_row, decode_rows, insert_returning};

const GAME_FLOATS: &[&str] = &["starting_cash"];

// =============================================================================
// Games
// =============================================================================

/// Games, newest first, optionally of one status.
pub async fn list_games(
    store: &dyn TableStore,
    status: Option<&str>,
    limit: Option<usize>,
) -> LedgerResult<Vec<Game>> {
    let mut query = Query::new().order_by("id", true).maybe_limit(limit);
    if let Some(status) = status {
        query = query.eq("status", status);
    }
    let rows = store.select(tables::GAMES, &query).await?;
    decode_rows(rows, GAME_FLOATS)
}

pub async fn get_game(store: &dyn TableStore, id: GameId) -> LedgerResult<Option<Game>> {
    let query = Query::new().eq("id", id.raw());
    match store.select_one(tables::GAMES, query).await? {
        Some(row) => Ok(Some(decode_row(row, GAME_FLOATS)?)),
        None => Ok(None),
    }
}

/// Return the active game with `request.code`, or create a new game.
pub async fn create_or_get_game(store: &dyn TableStore, request: &GameCreate) -> LedgerResult<Game> {
    let code = request.code.as_deref().map(str::trim).filter(|c| !c.is_empty());

    if let Some(code) = code {
        let query = Query::new()
            .eq("code", code)
            .eq("status", types::entities::DEFAULT_GAME_STATUS);
        if let Some(row) = store.select_one(tables::GAMES, query).await? {
            return decode_row(row, GAME_FLOATS);
        }
    }

    let row = encode(&GameCreate {
        code: code.map(str::to_string),
        starting_cash: request.starting_cash,
        status: request.status.clone(),
    })?;
    let game: Game = insert_returning(store, tables::GAMES, row, GAME_FLOATS).await?;
    info!(id = game.id.raw(), code = ?game.code, "Game created");
    Ok(game)
}

// =============================================================================
// Rounds
// =============================================================================

/// Rounds of a game by round number.
pub async fn list_rounds(store: &dyn TableStore, game_id: GameId) -> LedgerResult<Vec<Round>> {
    let query = Query::new()
        .eq("game_id", game_id.raw())
        .order_by("round_no", false);
    let rows = store.select(tables::ROUNDS, &query).await?;
    decode_rows(rows, &[])
}

pub async fn get_round(store: &dyn TableStore, id: RoundId) -> LedgerResult<Option<Round>> {
    let query = Query::new().eq("id", id.raw());
    match store.select_one(tables::ROUNDS, query).await? {
        Some(row) => Ok(Some(decode_row(row, &[])?)),
        None => Ok(None),
    }
}

/// Return round `round_no` of the game, creating it (started now) if needed.
pub async fn create_or_get_round(store: &dyn TableStore, request: &RoundCreate) -> LedgerResult<Round> {
    if request.round_no < 1 {
        return Err(LedgerError::Validation("round_no must be at least 1".into()));
    }

    let query = Query::new()
        .eq("game_id", request.game_id.raw())
        .eq("round_no", request.round_no);
    if let Some(row) = store.select_one(tables::ROUNDS, query).await? {
        return decode_row(row, &[]);
    }

    let mut row = encode(request)?;
    row.insert("starts_at".into(), types::now_iso().into());
    let round: Round = insert_returning(store, tables::ROUNDS, row, &[]).await?;
    info!(id = round.id.raw(), game_id = round.game_id.raw(), round_no = round.round_no, "Round created");
    Ok(round)
}

/// Stamp `ends_at` with the current time. `None` if the round does not exist.
pub async fn end_round(store: &dyn TableStore, id: RoundId) -> LedgerResult<Option<Round>> {
    let mut patch = Row::new();
    patch.insert("ends_at".into(), types::now_iso().into());
    let rows = store
        .update(tables::ROUNDS, &[Filter::eq("id", id.raw())], patch)
        .await?;
    match rows.into_iter().next() {
        Some(row) => Ok(Some(decode_row(row, &[])?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    #[tokio::test]
    async fn test_create_or_get_game_by_code() {
        let store = MemoryStore::new();
        let request = GameCreate {
            code: Some("ALPHA".into()),
            ..Default::default()
        };
        let first = create_or_get_game(&store, &request).await.unwrap();
        let second = create_or_get_game(&store, &request).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.starting_cash, 10_000.0);
        assert_eq!(first.status, "active");

        // Games without a code are always new.
        let a = create_or_get_game(&store, &GameCreate::default()).await.unwrap();
        let b = create_or_get_game(&store, &GameCreate::default()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.code, None);
    }

    #[tokio::test]
    async fn test_finished_game_code_creates_new_game() {
        let store = MemoryStore::new();
        let finished = GameCreate {
            code: Some("BETA".into()),
            starting_cash: 5_000.0,
            status: "finished".into(),
        };
        let old = create_or_get_game(&store, &finished).await.unwrap();
        let fresh = create_or_get_game(
            &store,
            &GameCreate {
                code: Some("BETA".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_ne!(old.id, fresh.id);
    }

    #[tokio::test]
    async fn test_list_games_newest_first_with_status() {
        let store = MemoryStore::new();
        for status in ["active", "finished", "active"] {
            let request = GameCreate {
                status: status.into(),
                ..Default::default()
            };
            create_or_get_game(&store, &request).await.unwrap();
        }

        let all = list_games(&store, None, None).await.unwrap();
        assert_eq!(all.iter().map(|g| g.id.raw()).collect::<Vec<_>>(), vec![3, 2, 1]);

        let active = list_games(&store, Some("active"), Some(1)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, GameId(3));

        assert!(get_game(&store, GameId(2)).await.unwrap().is_some());
        assert!(get_game(&store, GameId(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rounds_lifecycle() {
        let store = MemoryStore::new();
        let game_id = GameId(1);

        let second = create_or_get_round(&store, &RoundCreate { game_id, round_no: 2 })
            .await
            .unwrap();
        let first = create_or_get_round(&store, &RoundCreate { game_id, round_no: 1 })
            .await
            .unwrap();
        let again = create_or_get_round(&store, &RoundCreate { game_id, round_no: 2 })
            .await
            .unwrap();
        assert_eq!(second.id, again.id);
        assert!(first.starts_at.is_some());
        assert!(!first.is_ended());

        let rounds = list_rounds(&store, game_id).await.unwrap();
        assert_eq!(rounds.iter().map(|r| r.round_no).collect::<Vec<_>>(), vec![1, 2]);
        assert!(list_rounds(&store, GameId(7)).await.unwrap().is_empty());

        let ended = end_round(&store, first.id).await.unwrap().unwrap();
        assert!(ended.is_ended());
        assert!(get_round(&store, first.id).await.unwrap().unwrap().is_ended());
        assert!(end_round(&store, RoundId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_number_must_be_positive() {
        let store = MemoryStore::new();
        let err = create_or_get_round(&store, &RoundCreate { game_id: GameId(1), round_no: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
