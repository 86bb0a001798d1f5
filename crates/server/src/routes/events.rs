//! Market event endpoints.
//!
//! # Endpoints
//!
//! - `GET /api/events?limit=N&type=T` - Stored events, newest first
//! - `POST /api/events` - Generate an event (persisted best-effort)
//! - `GET /api/events/blackswan?limit=N` - Stored black swans
//! - `GET /api/events/news?limit=N` - Stored macro and micro news
//! - `GET|PUT|DELETE /api/events/{id}` - By store row id or runtime id
//!
//! Generation answers 201 even when the store is down: the event is still
//! returned and `message` says it was not stored.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use types::{EventCategory, EventCreate, EventResponse, EventUpdate, EventsListResponse, MessageResponse};

use super::check_limit;
use crate::error::{AppError, AppResult};
use crate::state::ServerState;

/// Query parameters for `GET /api/events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    pub limit: Option<usize>,
    /// `MACRO`, `MICRO` or `BLACKSWAN`.
    #[serde(rename = "type")]
    pub category: Option<String>,
}

/// Query parameters with only a limit.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// `GET /api/events`
pub async fn list_events(
    State(state): State<ServerState>,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> AppResult<Json<EventsListResponse>> {
    let Query(query) = query?;
    let limit = check_limit(query.limit)?;
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<EventCategory>().map_err(AppError::BadRequest)?),
    };

    let events = state.events.list(limit, category).await?;
    Ok(Json(events.into()))
}

/// `POST /api/events`
///
/// The body is optional; an empty body generates a macro or micro event.
pub async fn create_event(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    let request = parse_create(&body)?;
    let outcome = state.events.generate(&request).await?;
    let message = outcome.message();
    Ok((StatusCode::CREATED, Json(EventResponse::ok(outcome.event, message))))
}

fn parse_create(body: &[u8]) -> AppResult<EventCreate> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EventCreate::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

/// `GET /api/events/blackswan`
pub async fn list_black_swans(
    State(state): State<ServerState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Json<EventsListResponse>> {
    let Query(query) = query?;
    let events = state.events.list_black_swans(check_limit(query.limit)?).await?;
    Ok(Json(events.into()))
}

/// `GET /api/events/news`
pub async fn list_news(
    State(state): State<ServerState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Json<EventsListResponse>> {
    let Query(query) = query?;
    let events = state.events.list_news(check_limit(query.limit)?).await?;
    Ok(Json(events.into()))
}

/// `GET /api/events/{id}`
pub async fn get_event(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventResponse>> {
    match state.events.get(&id).await? {
        Some(event) => Ok(Json(EventResponse::ok(event, "Event retrieved successfully"))),
        None => Err(AppError::not_found("Event", &id)),
    }
}

/// `PUT /api/events/{id}`
pub async fn update_event(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<EventUpdate>, JsonRejection>,
) -> AppResult<Json<EventResponse>> {
    let Json(update) = body?;
    match state.events.update(&id, &update).await? {
        Some(event) => Ok(Json(EventResponse::ok(event, "Event updated successfully"))),
        None => Err(AppError::not_found("Event", &id)),
    }
}

/// `DELETE /api/events/{id}`
pub async fn delete_event(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if state.events.delete(&id).await? {
        Ok(Json(MessageResponse::ok(format!("Event '{id}' deleted successfully"))))
    } else {
        Err(AppError::not_found("Event", &id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_accepts_empty_body() {
        assert_eq!(parse_create(b"").unwrap(), EventCreate::default());
        assert_eq!(parse_create(b"  \n").unwrap(), EventCreate::default());
    }

    #[test]
    fn test_parse_create_body() {
        let request = parse_create(br#"{"type": "MICRO", "forceBlackSwan": true}"#).unwrap();
        assert_eq!(request.category, Some(EventCategory::Micro));
        assert!(request.force_black_swan);

        let err = parse_create(br#"{"type": "WEATHER"}"#).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
