// HTTP handlers for user administration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::query::Paginated;
use crate::users::{
    error::UserError,
    models::{
        CreateUserRequest, IdResponse, PasswordResetResponse, SetRolesRequest, UpdateUserRequest,
        UserListQuery, UserResponse, UserWithRoles,
    },
    repository::UserFilter,
};
use crate::AppState;

/// Handler for GET /api/admin/users
/// Paginated user listing with search and filters
pub async fn list_users_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Paginated<UserWithRoles>>, UserError> {
    user.require_permission("users.view")?;

    let filter = UserFilter {
        search: query.search.clone(),
        active: query.active,
        role_id: query.role_id,
    };
    let page = state.user_service.list(&filter, &query.pagination()).await?;

    Ok(Json(page))
}

/// Handler for GET /api/admin/users/{user_id}
pub async fn get_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserWithRoles>, UserError> {
    user.require_permission("users.view")?;

    let found = state.user_service.get(user_id).await?;
    Ok(Json(found))
}

/// Handler for POST /api/admin/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<IdResponse>), UserError> {
    user.require_permission("users.create")?;
    request
        .validate()
        .map_err(|e| UserError::ValidationError(e.to_string()))?;

    let created = state.user_service.create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(IdResponse {
            id: created.id,
            message: "User created".to_string(),
        }),
    ))
}

/// Handler for PUT /api/admin/users/{user_id}
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, UserError> {
    user.require_permission("users.edit")?;
    request
        .validate()
        .map_err(|e| UserError::ValidationError(e.to_string()))?;

    let updated = state.user_service.update(user_id, &request).await?;
    Ok(Json(updated.into()))
}

/// Handler for DELETE /api/admin/users/{user_id}
pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, UserError> {
    user.require_permission("users.delete")?;

    state.user_service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/admin/users/{user_id}/toggle-active
pub async fn toggle_user_active_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, UserError> {
    user.require_permission("users.edit")?;

    let updated = state.user_service.toggle_active(user_id).await?;
    Ok(Json(updated.into()))
}

/// Handler for GET /api/admin/users/{user_id}/roles
pub async fn get_user_roles_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<crate::models::Role>>, UserError> {
    user.require_permission("users.view")?;

    let roles = state.user_service.roles_of(user_id).await?;
    Ok(Json(roles))
}

/// Handler for PUT /api/admin/users/{user_id}/roles
/// Replaces the user's role assignments; the caller is recorded as assigner.
pub async fn set_user_roles_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetRolesRequest>,
) -> Result<Json<UserWithRoles>, UserError> {
    user.require_permission("users.roles")?;

    let updated = state
        .user_service
        .set_roles(user_id, &request.role_ids, user.0.user.id)
        .await?;
    Ok(Json(updated))
}

/// Handler for POST /api/admin/users/{user_id}/reset-password
/// Returns the generated temporary password exactly once.
pub async fn reset_user_password_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PasswordResetResponse>, UserError> {
    user.require_permission("users.edit")?;

    let password = state.user_service.reset_password(user_id).await?;
    Ok(Json(PasswordResetResponse { password }))
}

/// Handler for POST /api/admin/users/{user_id}/verify-email
pub async fn verify_user_email_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, UserError> {
    user.require_permission("users.edit")?;

    let updated = state.user_service.verify_email(user_id).await?;
    Ok(Json(updated.into()))
}

/// Handler for GET /api/admin/users/{user_id}/permissions
/// Lists the user's effective permission codes.
pub async fn get_user_permissions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<String>>, UserError> {
    user.require_permission("users.view")?;

    let codes = state.user_service.effective_permissions(user_id).await?;
    Ok(Json(codes))
}

/// Handler for POST /api/admin/users/{user_id}/anonymize
pub async fn anonymize_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, UserError> {
    user.require_permission("users.delete")?;

    let updated = state.user_service.anonymize(user_id).await?;
    Ok(Json(updated.into()))
}
