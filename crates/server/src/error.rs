//! Unified error handling for the API.
//!
//! Every failure leaves a handler as an [`AppError`], which renders the
//! `{success: false, message, status}` envelope.
//!
//! | Source                            | Status |
//! |-----------------------------------|--------|
//! | validation, duplicate, bad JSON   | 400    |
//! | missing entity                    | 404    |
//! | store unreachable or rejecting    | 503    |
//! | store echoed nothing, empty pool  | 500    |

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use ledger::LedgerError;
use news::EventServiceError;
use store::StoreError;
use types::ErrorResponse;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Invalid request data (400).
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500).
    #[error("{0}")]
    Internal(String),

    /// Store unavailable (503).
    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// 404 for an entity looked up by id.
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} with id '{id}' not found"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!(%message, "Request failed"),
            StatusCode::SERVICE_UNAVAILABLE => warn!(%message, "Store unavailable"),
            _ => {}
        }

        let body = Json(ErrorResponse::new(status.as_u16(), message));
        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Decode(msg) => AppError::Internal(format!("Malformed row from store: {msg}")),
            other => AppError::Unavailable(format!("Database error: {other}")),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Store(e) => e.into(),
            LedgerError::Validation(msg) | LedgerError::Conflict(msg) => AppError::BadRequest(msg),
            LedgerError::Missing(table) => AppError::Internal(format!("store returned no row for {table}")),
        }
    }
}

impl From<EventServiceError> for AppError {
    fn from(e: EventServiceError) -> Self {
        match e {
            EventServiceError::Store(e) => e.into(),
            EventServiceError::Generate(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Game", 42);
        assert_eq!(err.to_string(), "Game with id '42' not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_errors_are_unavailable() {
        let err: AppError = StoreError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = StoreError::Decode("missing field".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_ledger_error_mapping() {
        let err: AppError = LedgerError::Conflict("dup".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: AppError = LedgerError::Missing("games").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_envelope() {
        let response = AppError::BadRequest("limit must be between 1 and 1000".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.success);
        assert_eq!(body.status, 400);
        assert_eq!(body.message, "limit must be between 1 and 1000");
    }
}
