// Database access for the authentication core

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::auth::models::UpdateProfileRequest;
use crate::models::{Permission, Role, RoleWithPermissions, User, UserWithAccess};

/// Columns shared by every user row query.
const USER_COLUMNS: &str = "id, email, password_hash, last_name, first_name, phone, city, address, \
     active, email_verified, last_login_at, created_at, updated_at";

/// Join materializing a user together with roles and role permissions.
///
/// This is the eager-load contract of the auth core: one statement brings
/// back the whole permission-evaluation graph, so the in-memory predicates
/// never trigger follow-up queries.
const ACCESS_QUERY: &str = "\
SELECT u.id, u.email, u.password_hash, u.last_name, u.first_name, u.phone, \
       u.city, u.address, u.active, u.email_verified, u.last_login_at, \
       u.created_at, u.updated_at, \
       r.id AS role_id, r.code AS role_code, r.name AS role_name, \
       r.description AS role_description, r.hierarchy_level AS role_hierarchy_level, \
       r.active AS role_active, r.created_at AS role_created_at, \
       r.updated_at AS role_updated_at, \
       p.id AS permission_id, p.code AS permission_code, p.name AS permission_name, \
       p.description AS permission_description, p.category AS permission_category, \
       p.created_at AS permission_created_at \
FROM users u \
LEFT JOIN user_roles ur ON ur.user_id = u.id \
LEFT JOIN roles r ON r.id = ur.role_id \
LEFT JOIN role_permissions rp ON rp.role_id = r.id \
LEFT JOIN permissions p ON p.id = rp.permission_id";

/// One row of the user/role/permission join. Role and permission columns
/// are NULL when the user holds no roles or a role grants no permissions.
#[derive(sqlx::FromRow)]
struct AccessRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    last_name: String,
    first_name: String,
    phone: Option<String>,
    city: Option<String>,
    address: Option<String>,
    active: bool,
    email_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role_id: Option<Uuid>,
    role_code: Option<String>,
    role_name: Option<String>,
    role_description: Option<String>,
    role_hierarchy_level: Option<i32>,
    role_active: Option<bool>,
    role_created_at: Option<DateTime<Utc>>,
    role_updated_at: Option<DateTime<Utc>>,
    permission_id: Option<Uuid>,
    permission_code: Option<String>,
    permission_name: Option<String>,
    permission_description: Option<String>,
    permission_category: Option<String>,
    permission_created_at: Option<DateTime<Utc>>,
}

/// Repository loading users together with their access graph.
#[derive(Clone)]
pub struct AccessRepository {
    pool: PgPool,
}

impl AccessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a user by email with roles and role permissions in one query.
    pub async fn find_with_access_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithAccess>, AuthError> {
        let query = format!("{ACCESS_QUERY} WHERE u.email = $1 ORDER BY r.code, p.code");
        let rows = sqlx::query_as::<_, AccessRow>(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        Ok(fold_access_rows(rows))
    }

    /// Load a user by id with roles and role permissions in one query.
    pub async fn find_with_access_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<UserWithAccess>, AuthError> {
        let query = format!("{ACCESS_QUERY} WHERE u.id = $1 ORDER BY r.code, p.code");
        let rows = sqlx::query_as::<_, AccessRow>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(fold_access_rows(rows))
    }

    /// Bare user row without the role join; used by token refresh, which only
    /// needs existence and the active flag.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a new password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Apply a partial profile update, keeping current values for absent
    /// fields.
    pub async fn update_profile(
        &self,
        current: &User,
        update: &UpdateProfileRequest,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE users \
             SET last_name = $1, first_name = $2, phone = $3, city = $4, address = $5, \
                 updated_at = NOW() \
             WHERE id = $6",
        )
        .bind(update.last_name.as_ref().unwrap_or(&current.last_name))
        .bind(update.first_name.as_ref().unwrap_or(&current.first_name))
        .bind(update.phone.as_ref().or(current.phone.as_ref()))
        .bind(update.city.as_ref().or(current.city.as_ref()))
        .bind(update.address.as_ref().or(current.address.as_ref()))
        .bind(current.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Group the flat join rows into the user aggregate. The first row carries
/// the user columns; roles are deduplicated by id and collect their
/// permissions.
fn fold_access_rows(rows: Vec<AccessRow>) -> Option<UserWithAccess> {
    let first = rows.first()?;
    let user = User {
        id: first.id,
        email: first.email.clone(),
        password_hash: first.password_hash.clone(),
        last_name: first.last_name.clone(),
        first_name: first.first_name.clone(),
        phone: first.phone.clone(),
        city: first.city.clone(),
        address: first.address.clone(),
        active: first.active,
        email_verified: first.email_verified,
        last_login_at: first.last_login_at,
        created_at: first.created_at,
        updated_at: first.updated_at,
    };

    let mut roles: Vec<RoleWithPermissions> = Vec::new();
    for row in &rows {
        let Some(role_id) = row.role_id else {
            continue;
        };

        let position = match roles.iter().position(|held| held.role.id == role_id) {
            Some(position) => position,
            None => {
                roles.push(RoleWithPermissions {
                    role: Role {
                        id: role_id,
                        code: row.role_code.clone().unwrap_or_default(),
                        name: row.role_name.clone().unwrap_or_default(),
                        description: row.role_description.clone(),
                        hierarchy_level: row.role_hierarchy_level.unwrap_or(0),
                        active: row.role_active.unwrap_or(true),
                        created_at: row.role_created_at.unwrap_or(user.created_at),
                        updated_at: row.role_updated_at.unwrap_or(user.updated_at),
                    },
                    permissions: Vec::new(),
                });
                roles.len() - 1
            }
        };

        if let Some(permission_id) = row.permission_id {
            roles[position].permissions.push(Permission {
                id: permission_id,
                code: row.permission_code.clone().unwrap_or_default(),
                name: row.permission_name.clone().unwrap_or_default(),
                description: row.permission_description.clone(),
                category: row.permission_category.clone(),
                created_at: row.permission_created_at.unwrap_or(user.created_at),
            });
        }
    }

    Some(UserWithAccess { user, roles })
}
