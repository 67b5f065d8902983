use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;

/// Error types for user administration
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("User not found")]
    NotFound,

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            UserError::Auth(err) => return err.into_response(),
            UserError::DatabaseError(msg) => {
                tracing::error!("Database error in user admin: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            UserError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            UserError::RoleNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Role not found: {}", id))
            }
            UserError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            UserError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
