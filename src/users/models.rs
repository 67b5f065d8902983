// User administration DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Role, User};
use crate::query::PaginationParams;

/// Query parameters for GET /api/admin/users
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    /// Case-insensitive match on email, last name or first name
    pub search: Option<String>,
    pub active: Option<bool>,
    pub role_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl UserListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Body for POST /api/admin/users
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Body for PUT /api/admin/users/{id}; absent fields keep their values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

/// Body for PUT /api/admin/users/{id}/roles
#[derive(Debug, Deserialize)]
pub struct SetRolesRequest {
    pub role_ids: Vec<Uuid>,
}

/// User representation returned by the admin API (never exposes the hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub active: bool,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            last_name: user.last_name,
            first_name: user.first_name,
            phone: user.phone,
            city: user.city,
            address: user.address,
            active: user.active,
            email_verified: user.email_verified,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// User together with the roles assigned to it.
#[derive(Debug, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<Role>,
}

/// Response for resource creation.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
    pub message: String,
}

/// Response for POST /api/admin/users/{id}/reset-password: the temporary
/// password is returned exactly once and only its hash is stored.
#[derive(Debug, Serialize)]
pub struct PasswordResetResponse {
    pub password: String,
}
