//! Game and round endpoints.
//!
//! # Endpoints
//!
//! ## Games
//! - `GET /api/games?status=S&limit=N` - Newest first
//! - `POST /api/games` - Create, or return the active game with the same code
//! - `GET /api/games/{id}`
//!
//! ## Rounds
//! - `GET /api/games/rounds?game_id=G` - By round number
//! - `POST /api/games/rounds` - Create or return `(game_id, round_no)`
//! - `GET /api/games/rounds/{id}`
//! - `PUT /api/games/rounds/{id}/end` - Stamp `ends_at`

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use ledger::games;
use types::{
    GameCreate, GameId, GameResponse, GamesListResponse, RoundCreate, RoundId, RoundResponse,
    RoundsListResponse,
};

use super::check_limit;
use crate::error::{AppError, AppResult};
use crate::state::ServerState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for `GET /api/games`.
#[derive(Debug, Default, Deserialize)]
pub struct GamesQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

/// Query parameters for `GET /api/games/rounds`.
#[derive(Debug, Default, Deserialize)]
pub struct RoundsQuery {
    pub game_id: Option<i64>,
}

// =============================================================================
// Games
// =============================================================================

pub async fn list_games(
    State(state): State<ServerState>,
    query: Result<Query<GamesQuery>, QueryRejection>,
) -> AppResult<Json<GamesListResponse>> {
    let Query(query) = query?;
    let limit = check_limit(query.limit)?;
    let status = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let games = games::list_games(state.store(), status, limit).await?;
    Ok(Json(games.into()))
}

pub async fn create_game(
    State(state): State<ServerState>,
    body: Result<Json<GameCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<GameResponse>)> {
    let Json(request) = body?;
    let game = games::create_or_get_game(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(GameResponse::ok(game, "Game created or retrieved successfully")),
    ))
}

pub async fn get_game(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<GameResponse>> {
    let Path(id) = id?;
    match games::get_game(state.store(), GameId(id)).await? {
        Some(game) => Ok(Json(GameResponse::ok(game, "Game retrieved successfully"))),
        None => Err(AppError::not_found("Game", id)),
    }
}

// =============================================================================
// Rounds
// =============================================================================

pub async fn list_rounds(
    State(state): State<ServerState>,
    query: Result<Query<RoundsQuery>, QueryRejection>,
) -> AppResult<Json<RoundsListResponse>> {
    let Query(query) = query?;
    let game_id = query
        .game_id
        .ok_or_else(|| AppError::BadRequest("game_id is required".into()))?;
    let rounds = games::list_rounds(state.store(), GameId(game_id)).await?;
    Ok(Json(rounds.into()))
}

pub async fn create_round(
    State(state): State<ServerState>,
    body: Result<Json<RoundCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RoundResponse>)> {
    let Json(request) = body?;
    let round = games::create_or_get_round(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoundResponse::ok(round, "Round created or retrieved successfully")),
    ))
}

pub async fn get_round(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<RoundResponse>> {
    let Path(id) = id?;
    match games::get_round(state.store(), RoundId(id)).await? {
        Some(round) => Ok(Json(RoundResponse::ok(round, "Round retrieved successfully"))),
        None => Err(AppError::not_found("Round", id)),
    }
}

pub async fn end_round(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<RoundResponse>> {
    let Path(id) = id?;
    match games::end_round(state.store(), RoundId(id)).await? {
        Some(round) => Ok(Json(RoundResponse::ok(round, "Round ended successfully"))),
        None => Err(AppError::not_found("Round", id)),
    }
}
