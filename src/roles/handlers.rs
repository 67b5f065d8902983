// HTTP handlers for role administration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::models::{Permission, Role};
use crate::query::Paginated;
use crate::roles::{
    error::RoleError,
    models::{
        CreateRoleRequest, DuplicateRoleRequest, RoleListQuery, RoleWithPermissionsResponse,
        SetPermissionsRequest, UpdateRoleRequest,
    },
    repository::RoleFilter,
};
use crate::users::models::{IdResponse, UserResponse};
use crate::AppState;

/// Handler for GET /api/admin/roles
pub async fn list_roles_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RoleListQuery>,
) -> Result<Json<Paginated<Role>>, RoleError> {
    user.require_permission("users.view")?;

    let filter = RoleFilter {
        search: query.search.clone(),
        active: query.active,
    };
    let page = state.role_service.list(&filter, &query.pagination()).await?;

    Ok(Json(page))
}

/// Handler for GET /api/admin/roles/{role_id}
pub async fn get_role_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleWithPermissionsResponse>, RoleError> {
    user.require_permission("users.view")?;

    let role = state.role_service.get(role_id).await?;
    Ok(Json(role))
}

/// Handler for POST /api/admin/roles
pub async fn create_role_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<IdResponse>), RoleError> {
    user.require_permission("users.roles")?;
    request
        .validate()
        .map_err(|e| RoleError::ValidationError(e.to_string()))?;

    let created = state.role_service.create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(IdResponse {
            id: created.id,
            message: "Role created".to_string(),
        }),
    ))
}

/// Handler for PUT /api/admin/roles/{role_id}
pub async fn update_role_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Role>, RoleError> {
    user.require_permission("users.roles")?;
    request
        .validate()
        .map_err(|e| RoleError::ValidationError(e.to_string()))?;

    let updated = state.role_service.update(role_id, &request).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/roles/{role_id}
/// System roles (super_admin, admin, user) are refused with 409.
pub async fn delete_role_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
) -> Result<StatusCode, RoleError> {
    user.require_permission("users.roles")?;

    state.role_service.delete(role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/admin/roles/{role_id}/duplicate
pub async fn duplicate_role_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
    Json(request): Json<DuplicateRoleRequest>,
) -> Result<Json<RoleWithPermissionsResponse>, RoleError> {
    user.require_permission("users.roles")?;
    request
        .validate()
        .map_err(|e| RoleError::ValidationError(e.to_string()))?;

    let copy = state.role_service.duplicate(role_id, &request).await?;
    Ok(Json(copy))
}

/// Handler for POST /api/admin/roles/{role_id}/toggle-active
pub async fn toggle_role_active_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Role>, RoleError> {
    user.require_permission("users.roles")?;

    let updated = state.role_service.toggle_active(role_id).await?;
    Ok(Json(updated))
}

/// Handler for GET /api/admin/roles/{role_id}/permissions
pub async fn get_role_permissions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Vec<Permission>>, RoleError> {
    user.require_permission("users.view")?;

    let permissions = state.role_service.permissions_of(role_id).await?;
    Ok(Json(permissions))
}

/// Handler for PUT /api/admin/roles/{role_id}/permissions
/// Replaces the role's permission grants.
pub async fn set_role_permissions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
    Json(request): Json<SetPermissionsRequest>,
) -> Result<Json<RoleWithPermissionsResponse>, RoleError> {
    user.require_permission("users.roles")?;

    let updated = state
        .role_service
        .set_permissions(role_id, &request.permission_ids)
        .await?;
    Ok(Json(updated))
}

/// Handler for GET /api/admin/roles/{role_id}/users
pub async fn get_role_users_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Vec<UserResponse>>, RoleError> {
    user.require_permission("users.view")?;

    let users = state.role_service.users_of(role_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
