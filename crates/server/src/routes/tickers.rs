//! Ticker endpoints.
//!
//! - `GET /api/tickers` - All tickers by symbol
//! - `POST /api/tickers` - Create (400 on blank fields or duplicate symbol)
//! - `GET /api/tickers/{id}`, `GET /api/tickers/symbol/{symbol}`

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;

use ledger::tickers;
use types::{TickerCreate, TickerId, TickerResponse, TickersListResponse};

use crate::error::{AppError, AppResult};
use crate::state::ServerState;

pub async fn list_tickers(State(state): State<ServerState>) -> AppResult<Json<TickersListResponse>> {
    let tickers = tickers::list(state.store()).await?;
    Ok(Json(tickers.into()))
}

pub async fn get_ticker(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<TickerResponse>> {
    let Path(id) = id?;
    match tickers::get(state.store(), TickerId(id)).await? {
        Some(ticker) => Ok(Json(TickerResponse::ok(ticker, "Ticker retrieved successfully"))),
        None => Err(AppError::not_found("Ticker", id)),
    }
}

pub async fn get_ticker_by_symbol(
    State(state): State<ServerState>,
    Path(symbol): Path<String>,
) -> AppResult<Json<TickerResponse>> {
    match tickers::get_by_symbol(state.store(), &symbol).await? {
        Some(ticker) => Ok(Json(TickerResponse::ok(ticker, "Ticker retrieved successfully"))),
        None => Err(AppError::NotFound(format!(
            "Ticker with symbol '{symbol}' not found"
        ))),
    }
}

pub async fn create_ticker(
    State(state): State<ServerState>,
    body: Result<Json<TickerCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TickerResponse>)> {
    let Json(request) = body?;
    let ticker = tickers::create(state.store(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(TickerResponse::ok(ticker, "Ticker created successfully")),
    ))
}
