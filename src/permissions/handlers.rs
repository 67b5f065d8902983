// HTTP handlers for permission administration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::models::{Permission, Role};
use crate::permissions::{
    error::PermissionError,
    models::{
        CreatePermissionRequest, PermissionListQuery, PermissionMatrix, UpdatePermissionRequest,
    },
    repository::PermissionFilter,
};
use crate::query::Paginated;
use crate::users::models::IdResponse;
use crate::AppState;

/// Handler for GET /api/admin/permissions
pub async fn list_permissions_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PermissionListQuery>,
) -> Result<Json<Paginated<Permission>>, PermissionError> {
    user.require_permission("users.view")?;

    let filter = PermissionFilter {
        search: query.search.clone(),
        category: query.category.clone(),
    };
    let page = state
        .permission_service
        .list(&filter, &query.pagination())
        .await?;

    Ok(Json(page))
}

/// Handler for GET /api/admin/permissions/matrix
/// The permission-by-role matrix used by the admin UI.
pub async fn get_permissions_matrix_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<PermissionMatrix>, PermissionError> {
    user.require_permission("users.view")?;

    let matrix = state.permission_service.matrix().await?;
    Ok(Json(matrix))
}

/// Handler for GET /api/admin/permissions/{permission_id}
pub async fn get_permission_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(permission_id): Path<Uuid>,
) -> Result<Json<Permission>, PermissionError> {
    user.require_permission("users.view")?;

    let permission = state.permission_service.get(permission_id).await?;
    Ok(Json(permission))
}

/// Handler for POST /api/admin/permissions
pub async fn create_permission_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<IdResponse>), PermissionError> {
    user.require_permission("users.roles")?;
    request
        .validate()
        .map_err(|e| PermissionError::ValidationError(e.to_string()))?;

    let created = state.permission_service.create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(IdResponse {
            id: created.id,
            message: "Permission created".to_string(),
        }),
    ))
}

/// Handler for PUT /api/admin/permissions/{permission_id}
pub async fn update_permission_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(permission_id): Path<Uuid>,
    Json(request): Json<UpdatePermissionRequest>,
) -> Result<Json<Permission>, PermissionError> {
    user.require_permission("users.roles")?;
    request
        .validate()
        .map_err(|e| PermissionError::ValidationError(e.to_string()))?;

    let updated = state
        .permission_service
        .update(permission_id, &request)
        .await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/admin/permissions/{permission_id}
pub async fn delete_permission_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(permission_id): Path<Uuid>,
) -> Result<StatusCode, PermissionError> {
    user.require_permission("users.roles")?;

    state.permission_service.delete(permission_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/admin/permissions/{permission_id}/roles
pub async fn get_permission_roles_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(permission_id): Path<Uuid>,
) -> Result<Json<Vec<Role>>, PermissionError> {
    user.require_permission("users.view")?;

    let roles = state.permission_service.roles_of(permission_id).await?;
    Ok(Json(roles))
}
