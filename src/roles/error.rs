use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;

/// Error types for role administration
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Role not found")]
    NotFound,

    #[error("Permission not found: {0}")]
    PermissionNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for RoleError {
    fn from(err: sqlx::Error) -> Self {
        RoleError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for RoleError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            RoleError::Auth(err) => return err.into_response(),
            RoleError::DatabaseError(msg) => {
                tracing::error!("Database error in role admin: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            RoleError::NotFound => (StatusCode::NOT_FOUND, "Role not found".to_string()),
            RoleError::PermissionNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Permission not found: {}", id))
            }
            RoleError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            RoleError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
