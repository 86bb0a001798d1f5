//! Price snapshot endpoints.
//!
//! - `POST /api/price-snapshots`
//! - `POST /api/price-snapshots/batch` - 1 to 1000 snapshots
//! - `GET /api/price-snapshots?game_id&round_id&ticker_id&limit`

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use ledger::price_snapshots::{self, SnapshotFilter};
use types::{
    GameId, PriceSnapshotBatchCreate, PriceSnapshotCreate, PriceSnapshotResponse,
    PriceSnapshotsListResponse, RoundId, TickerId,
};

use super::check_limit;
use crate::error::AppResult;
use crate::state::ServerState;

/// Query parameters for `GET /api/price-snapshots`.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotsQuery {
    pub game_id: Option<i64>,
    pub round_id: Option<i64>,
    pub ticker_id: Option<i64>,
    pub limit: Option<usize>,
}

impl SnapshotsQuery {
    fn to_filter(&self) -> SnapshotFilter {
        SnapshotFilter {
            game_id: self.game_id.map(GameId),
            round_id: self.round_id.map(RoundId),
            ticker_id: self.ticker_id.map(TickerId),
            limit: self.limit,
        }
    }
}

pub async fn create_snapshot(
    State(state): State<ServerState>,
    body: Result<Json<PriceSnapshotCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PriceSnapshotResponse>)> {
    let Json(request) = body?;
    let snapshot = price_snapshots::create(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(PriceSnapshotResponse::ok(snapshot, "Price snapshot created successfully")),
    ))
}

pub async fn create_snapshot_batch(
    State(state): State<ServerState>,
    body: Result<Json<PriceSnapshotBatchCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PriceSnapshotsListResponse>)> {
    let Json(request) = body?;
    let snapshots = price_snapshots::create_batch(state.store(), &request.snapshots).await?;
    Ok((StatusCode::CREATED, Json(snapshots.into())))
}

pub async fn list_snapshots(
    State(state): State<ServerState>,
    query: Result<Query<SnapshotsQuery>, QueryRejection>,
) -> AppResult<Json<PriceSnapshotsListResponse>> {
    let Query(query) = query?;
    check_limit(query.limit)?;
    let snapshots = price_snapshots::query(state.store(), &query.to_filter()).await?;
    Ok(Json(snapshots.into()))
}
