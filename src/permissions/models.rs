// Permission administration DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::query::PaginationParams;

/// Query parameters for GET /api/admin/permissions
#[derive(Debug, Default, Deserialize)]
pub struct PermissionListQuery {
    /// Case-insensitive match on code or name
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PermissionListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body for POST /api/admin/permissions
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Body for PUT /api/admin/permissions/{id}; absent fields keep their values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// One row of the permission-by-role matrix: which role codes grant this
/// permission.
#[derive(Debug, Serialize)]
pub struct MatrixEntry {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub roles: BTreeMap<String, bool>,
}

/// Role column of the matrix.
#[derive(Debug, Serialize)]
pub struct MatrixRole {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

/// The full permission-by-role matrix, permissions ordered by category then
/// code, roles most senior first.
#[derive(Debug, Serialize)]
pub struct PermissionMatrix {
    pub permissions: Vec<MatrixEntry>,
    pub roles: Vec<MatrixRole>,
}
