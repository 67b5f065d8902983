// Role administration DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Permission, Role};
use crate::query::PaginationParams;

/// Query parameters for GET /api/admin/roles
#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    /// Case-insensitive match on code or name
    pub search: Option<String>,
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RoleListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body for POST /api/admin/roles
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub hierarchy_level: Option<i32>,
    pub active: Option<bool>,
}

/// Body for PUT /api/admin/roles/{id}; absent fields keep their values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub hierarchy_level: Option<i32>,
    pub active: Option<bool>,
}

/// Body for POST /api/admin/roles/{id}/duplicate
#[derive(Debug, Deserialize, Validate)]
pub struct DuplicateRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Body for PUT /api/admin/roles/{id}/permissions
#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    pub permission_ids: Vec<Uuid>,
}

/// Role together with the permissions it grants.
#[derive(Debug, Serialize)]
pub struct RoleWithPermissionsResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}
