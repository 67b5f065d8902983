// Request authentication extractors and the permission gate

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::warn;

use crate::auth::error::AuthError;
use crate::models::UserWithAccess;
use crate::AppState;

/// Extractor resolving the bearer token to the fully loaded user.
///
/// Resolution order: Authorization header presence, Bearer scheme, token
/// decode, access-kind check, user load with the complete role/permission
/// graph, active check. Every failure maps to 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserWithAccess);

impl AuthenticatedUser {
    /// Per-route permission gate.
    ///
    /// Called with the required permission code at the top of each protected
    /// handler; a pure predicate over the already-loaded aggregate.
    pub fn require_permission(&self, code: &str) -> Result<(), AuthError> {
        if self.0.has_permission(code) {
            Ok(())
        } else {
            warn!("User {} denied: permission '{}' required", self.0.user.id, code);
            Err(AuthError::PermissionDenied(code.to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let account = state.auth_service.authenticate(token).await?;
        Ok(AuthenticatedUser(account))
    }
}

/// Second-stage extractor re-checking `active` for routes that only depend
/// on that narrower contract. The check duplicates the one in
/// `AuthService::authenticate` on purpose.
#[derive(Debug, Clone)]
pub struct ActiveUser(pub UserWithAccess);

#[async_trait]
impl<S> FromRequestParts<S> for ActiveUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(account) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        if !account.user.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(ActiveUser(account))
    }
}
