// Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::token::TokenPair;
use crate::models::UserWithAccess;

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Form body for POST /api/auth/login (OAuth2 password-form field names).
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    /// The account email
    pub username: String,
    pub password: String,
}

/// JSON body for POST /api/auth/login/json.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body for POST /api/auth/refresh.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body for PUT /api/auth/me/password.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Partial self-profile update. Absent fields keep their current values;
/// fields cannot be cleared to null through this endpoint.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Simple message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Permission entry nested in profile responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
}

/// Role entry nested in profile responses, with the permissions it grants.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub hierarchy_level: i32,
    pub active: bool,
    pub permissions: Vec<PermissionSummary>,
}

/// Profile of the authenticated user with the resolved access graph.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
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
    pub roles: Vec<RoleSummary>,
    /// Distinct permission codes granted through held roles.
    pub permissions: Vec<String>,
}

impl From<UserWithAccess> for UserProfile {
    fn from(account: UserWithAccess) -> Self {
        let permissions = account.permission_codes();
        let roles = account
            .roles
            .into_iter()
            .map(|held| RoleSummary {
                id: held.role.id,
                code: held.role.code,
                name: held.role.name,
                hierarchy_level: held.role.hierarchy_level,
                active: held.role.active,
                permissions: held
                    .permissions
                    .into_iter()
                    .map(|perm| PermissionSummary {
                        id: perm.id,
                        code: perm.code,
                        name: perm.name,
                        category: perm.category,
                    })
                    .collect(),
            })
            .collect();
        let user = account.user;

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
            roles,
            permissions,
        }
    }
}
