// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// Errors surfaced by the authentication core.
///
/// Every credential-class failure maps to 401; the human-readable message is
/// deliberately the only distinction exposed to callers. `PermissionDenied`
/// is the single 403.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Account not configured")]
    AccountNotConfigured,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Account pending administrator validation")]
    AccountNotVerified,

    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect current password")]
    IncorrectPassword,

    #[error("Permission '{0}' required")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Password hashing error")]
    PasswordHash,

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl AuthError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::InvalidTokenType
            | AuthError::InvalidCredentials
            | AuthError::AccountNotConfigured
            | AuthError::AccountDisabled
            | AuthError::AccountNotVerified
            | AuthError::UserNotFound
            | AuthError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::PasswordHash | AuthError::TokenGeneration(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Database(msg) => {
                error!("Database error in auth: {}", msg);
                "Internal server error".to_string()
            }
            AuthError::PasswordHash => {
                error!("Password hashing error");
                "Internal server error".to_string()
            }
            AuthError::TokenGeneration(msg) => {
                error!("Token generation error: {}", msg);
                "Internal server error".to_string()
            }
            AuthError::PermissionDenied(code) => {
                warn!("Authorization failed: permission '{}' required", code);
                self.to_string()
            }
            AuthError::Validation(_) => self.to_string(),
            other => {
                warn!("Authentication failed: {}", other);
                self.to_string()
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
