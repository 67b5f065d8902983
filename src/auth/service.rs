// Authentication service - business logic layer

use tracing::{debug, info, warn};

use crate::auth::{
    error::AuthError,
    models::UpdateProfileRequest,
    password,
    repository::AccessRepository,
    token::{TokenKind, TokenPair, TokenService},
};
use crate::models::{User, UserWithAccess};

/// Service coordinating credential checks, token issuance and profile
/// maintenance.
#[derive(Clone)]
pub struct AuthService {
    repo: AccessRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(repo: AccessRepository, tokens: TokenService) -> Self {
        Self { repo, tokens }
    }

    /// Validate credentials and issue a fresh token pair.
    ///
    /// All failures surface as credential errors (401); callers cannot probe
    /// which check failed beyond the human-readable message. On success
    /// `last_login_at` is set before the tokens are issued.
    pub async fn login(&self, email: &str, password_input: &str) -> Result<TokenPair, AuthError> {
        let Some(account) = self.repo.find_with_access_by_email(email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(hash) = account.user.password_hash.as_deref() else {
            warn!("Login attempt on unconfigured account {}", account.user.id);
            return Err(AuthError::AccountNotConfigured);
        };

        if !password::verify_password(password_input, hash) {
            warn!("Password mismatch for user {}", account.user.id);
            return Err(AuthError::InvalidCredentials);
        }

        if !account.user.active {
            return Err(AuthError::AccountDisabled);
        }

        if !account.user.email_verified {
            return Err(AuthError::AccountNotVerified);
        }

        self.repo.touch_last_login(account.user.id).await?;
        info!("User {} logged in", account.user.id);

        self.tokens.create_pair(account.user.id)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The old refresh token stays structurally valid until it expires; no
    /// revocation store exists.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let Some(claims) = self.tokens.decode(refresh_token) else {
            return Err(AuthError::InvalidToken);
        };

        if claims.kind != TokenKind::Refresh {
            warn!("Non-refresh token presented to the refresh endpoint");
            return Err(AuthError::InvalidTokenType);
        }

        let Some(user) = self.repo.find_by_id(claims.sub).await? else {
            return Err(AuthError::UserNotFound);
        };

        if !user.active {
            return Err(AuthError::AccountDisabled);
        }

        debug!("Rotated token pair for user {}", user.id);
        self.tokens.create_pair(user.id)
    }

    /// Resolve a bearer access token to the fully loaded user.
    ///
    /// Rejects refresh tokens presented as access tokens, unknown subjects
    /// and disabled accounts; the returned aggregate carries the complete
    /// role/permission graph.
    pub async fn authenticate(&self, token: &str) -> Result<UserWithAccess, AuthError> {
        let Some(claims) = self.tokens.decode(token) else {
            return Err(AuthError::InvalidToken);
        };

        if claims.kind != TokenKind::Access {
            warn!("Non-access token presented as bearer credential");
            return Err(AuthError::InvalidTokenType);
        }

        let Some(account) = self.repo.find_with_access_by_id(claims.sub).await? else {
            return Err(AuthError::UserNotFound);
        };

        if !account.user.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(account)
    }

    /// Apply a partial profile update and return the refreshed aggregate.
    pub async fn update_profile(
        &self,
        current: &UserWithAccess,
        update: &UpdateProfileRequest,
    ) -> Result<UserWithAccess, AuthError> {
        self.repo.update_profile(&current.user, update).await?;

        self.repo
            .find_with_access_by_id(current.user.id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Change the password after verifying the current one.
    ///
    /// Outstanding tokens remain valid afterwards; there is no revocation
    /// mechanism.
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::AccountNotConfigured);
        };

        if !password::verify_password(current_password, hash) {
            warn!("Password change with wrong current password for user {}", user.id);
            return Err(AuthError::IncorrectPassword);
        }

        let new_hash = password::hash_password(new_password)?;
        self.repo.update_password(user.id, &new_hash).await?;
        info!("Password changed for user {}", user.id);

        Ok(())
    }
}
