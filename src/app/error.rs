use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::Error as SqlxError;

/// Application error type for unified error handling across the app.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No valid session where one is required (401). Not retried.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but the role lacks the permission (403).
    #[error("permission denied")]
    Unauthorized,

    /// Entity missing or outside the caller's tenant (404).
    /// Callers never learn which of the two it was.
    #[error("not found")]
    NotFound,

    /// Datastore call failed or timed out (503). Safe to retry.
    #[error("backend unavailable")]
    BackendUnavailable,

    /// Malformed input, rejected before any external call (400).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Authentication failures (400) - wrong credentials, duplicate account.
    /// Carries the provider-style message; see `features::auth::messages`.
    #[error("{0}")]
    Auth(String),

    /// Database errors (500)
    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    /// Generic internal errors (500)
    #[error("internal error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(_) | AppError::Auth(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(msg) | AppError::Auth(msg) => msg,
            AppError::Database(err) => {
                tracing::error!(%err, "database error");
                "Internal server error".to_string()
            }
            AppError::Internal => "Internal server error".to_string(),
            AppError::BackendUnavailable => {
                "Service temporarily unavailable, please retry".to_string()
            }
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::Unauthorized => "Permission denied".to_string(),
            AppError::NotFound => "Not found".to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
