use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;

/// Error types for permission administration
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Permission not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for PermissionError {
    fn from(err: sqlx::Error) -> Self {
        PermissionError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            PermissionError::Auth(err) => return err.into_response(),
            PermissionError::DatabaseError(msg) => {
                tracing::error!("Database error in permission admin: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            PermissionError::NotFound => {
                (StatusCode::NOT_FOUND, "Permission not found".to_string())
            }
            PermissionError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            PermissionError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
