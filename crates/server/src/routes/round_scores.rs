//! Round score endpoints.
//!
//! - `POST /api/round-scores`
//! - `GET /api/round-scores?round_id=R` (best P&L first) or `?participant_id=P` (round order)
//! - `GET /api/round-scores/{id}`

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use ledger::round_scores;
use types::{
    ParticipantId, RoundId, RoundScoreCreate, RoundScoreResponse, RoundScoresListResponse, ScoreId,
};

use crate::error::{AppError, AppResult};
use crate::state::ServerState;

/// Query parameters for `GET /api/round-scores`. `round_id` wins when both are set.
#[derive(Debug, Default, Deserialize)]
pub struct ScoresQuery {
    pub round_id: Option<i64>,
    pub participant_id: Option<i64>,
}

pub async fn create_score(
    State(state): State<ServerState>,
    body: Result<Json<RoundScoreCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RoundScoreResponse>)> {
    let Json(request) = body?;
    let score = round_scores::create(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoundScoreResponse::ok(score, "Round score created successfully")),
    ))
}

pub async fn list_scores(
    State(state): State<ServerState>,
    query: Result<Query<ScoresQuery>, QueryRejection>,
) -> AppResult<Json<RoundScoresListResponse>> {
    let Query(query) = query?;
    let scores = match (query.round_id, query.participant_id) {
        (Some(round_id), _) => round_scores::by_round(state.store(), RoundId(round_id)).await?,
        (None, Some(participant_id)) => {
            round_scores::by_participant(state.store(), ParticipantId(participant_id)).await?
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Must provide either round_id or participant_id".into(),
            ));
        }
    };
    Ok(Json(scores.into()))
}

pub async fn get_score(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<RoundScoreResponse>> {
    let Path(id) = id?;
    match round_scores::get(state.store(), ScoreId(id)).await? {
        Some(score) => Ok(Json(RoundScoreResponse::ok(score, "Round score retrieved successfully"))),
        None => Err(AppError::not_found("Round score", id)),
    }
}
