// HTTP handlers for authentication endpoints

use axum::{extract::State, Form, Json};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::{ActiveUser, AuthenticatedUser},
    models::{
        ChangePasswordRequest, LoginForm, LoginRequest, MessageResponse, RefreshRequest,
        TokenResponse, UpdateProfileRequest, UserProfile,
    },
};
use crate::AppState;

/// Handler for POST /api/auth/login
/// Form-encoded login with OAuth2 password-form field names.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 401, description = "Credentials rejected", body = String, example = json!({"error": "Incorrect email or password"}))
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    tracing::debug!("Login attempt (form)");

    let pair = state.auth_service.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(pair)))
}

/// Handler for POST /api/auth/login/json
/// JSON variant of login, functionally identical to the form endpoint.
#[utoipa::path(
    post,
    path = "/api/auth/login/json",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenResponse),
        (status = 401, description = "Credentials rejected", body = String)
    ),
    tag = "auth"
)]
pub async fn login_json_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    tracing::debug!("Login attempt (json)");
    request
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let pair = state.auth_service.login(&request.email, &request.password).await?;
    Ok(Json(TokenResponse::bearer(pair)))
}

/// Handler for POST /api/auth/refresh
/// Exchanges a valid refresh token for a new token pair.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair issued", body = TokenResponse),
        (status = 401, description = "Invalid, expired or wrong-kind token", body = String)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pair = state.auth_service.refresh(&request.refresh_token).await?;
    Ok(Json(TokenResponse::bearer(pair)))
}

/// Handler for POST /api/auth/logout
///
/// Stateless JWTs leave nothing to destroy server-side; clients must discard
/// their stored tokens. The bearer token is still required so unauthenticated
/// calls get 401.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = String)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout_handler(_user: AuthenticatedUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out"))
}

/// Handler for GET /api/auth/me
/// Returns the authenticated user's profile with roles and permissions.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = String)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me_handler(AuthenticatedUser(account): AuthenticatedUser) -> Json<UserProfile> {
    Json(UserProfile::from(account))
}

/// Handler for PUT /api/auth/me
/// Partially updates the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = String)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn update_me_handler(
    State(state): State<AppState>,
    ActiveUser(account): ActiveUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let updated = state.auth_service.update_profile(&account, &request).await?;
    Ok(Json(UserProfile::from(updated)))
}

/// Handler for PUT /api/auth/me/password
/// Changes the authenticated user's password after verifying the current one.
#[utoipa::path(
    put,
    path = "/api/auth/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Wrong current password or unconfigured account", body = String)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn change_password_handler(
    State(state): State<AppState>,
    ActiveUser(account): ActiveUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    state
        .auth_service
        .change_password(&account.user, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed")))
}
