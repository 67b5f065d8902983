// Database repository for user administration

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Role, User, SUPER_ADMIN_ROLE};
use crate::query::PaginationParams;
use crate::users::error::UserError;
use crate::users::models::{CreateUserRequest, UpdateUserRequest};

const USER_COLUMNS: &str = "id, email, password_hash, last_name, first_name, phone, city, address, \
     active, email_verified, last_login_at, created_at, updated_at";

const USER_COLUMNS_QUALIFIED: &str = "u.id, u.email, u.password_hash, u.last_name, u.first_name, \
     u.phone, u.city, u.address, u.active, u.email_verified, u.last_login_at, u.created_at, \
     u.updated_at";

/// Listing filters for the users table.
#[derive(Debug, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub active: Option<bool>,
    pub role_id: Option<Uuid>,
}

/// One (user, role) association row used to attach roles to a listed page.
#[derive(sqlx::FromRow)]
struct UserRoleRow {
    user_id: Uuid,
    id: Uuid,
    code: String,
    name: String,
    description: Option<String>,
    hierarchy_level: i32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for user administration
#[derive(Clone)]
pub struct UsersRepository {
    pool: PgPool,
}

impl UsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn base_query(select: &str, filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
        let mut sql = format!("SELECT {select} FROM users u");
        if filter.role_id.is_some() {
            sql.push_str(" JOIN user_roles ur ON ur.user_id = u.id");
        }

        let mut builder = QueryBuilder::new(sql);
        builder.push(" WHERE TRUE");

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (u.email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.first_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(active) = filter.active {
            builder.push(" AND u.active = ").push_bind(active);
        }
        if let Some(role_id) = filter.role_id {
            builder.push(" AND ur.role_id = ").push_bind(role_id);
        }

        builder
    }

    /// One page of users matching the filters plus the filtered total.
    pub async fn list(
        &self,
        filter: &UserFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<User>, i64), UserError> {
        let mut count = Self::base_query("COUNT(DISTINCT u.id)", filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = Self::base_query(
            &format!("DISTINCT {USER_COLUMNS_QUALIFIED}"),
            filter,
        );
        query.push(" ORDER BY u.created_at DESC");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok((users, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Insert a new user. A concurrent duplicate email surfaces as a
    /// conflict even when the service-level check passed.
    pub async fn create(
        &self,
        request: &CreateUserRequest,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let query = format!(
            "INSERT INTO users (email, password_hash, last_name, first_name, phone, city, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&request.email)
            .bind(password_hash)
            .bind(&request.last_name)
            .bind(&request.first_name)
            .bind(&request.phone)
            .bind(&request.city)
            .bind(&request.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return UserError::Conflict(
                            "A user with this email already exists".to_string(),
                        );
                    }
                }
                UserError::DatabaseError(e.to_string())
            })?;

        Ok(user)
    }

    /// Update a user, keeping current values for absent fields.
    pub async fn update(
        &self,
        current: &User,
        update: &UpdateUserRequest,
    ) -> Result<User, UserError> {
        let query = format!(
            "UPDATE users \
             SET email = $1, last_name = $2, first_name = $3, phone = $4, city = $5, \
                 address = $6, active = $7, updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(update.email.as_ref().unwrap_or(&current.email))
            .bind(update.last_name.as_ref().unwrap_or(&current.last_name))
            .bind(update.first_name.as_ref().unwrap_or(&current.first_name))
            .bind(update.phone.as_ref().or(current.phone.as_ref()))
            .bind(update.city.as_ref().or(current.city.as_ref()))
            .bind(update.address.as_ref().or(current.address.as_ref()))
            .bind(update.active.unwrap_or(current.active))
            .bind(current.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<User, UserError> {
        let query = format!(
            "UPDATE users SET active = $1, updated_at = NOW() WHERE id = $2 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(active)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_email_verified(&self, id: Uuid) -> Result<User, UserError> {
        let query = format!(
            "UPDATE users SET email_verified = TRUE, updated_at = NOW() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Overwrite identifying data and deactivate the account.
    pub async fn anonymize(&self, id: Uuid) -> Result<User, UserError> {
        let query = format!(
            "UPDATE users \
             SET email = 'anonymized_' || id::text || '@deleted.local', \
                 last_name = 'ANONYMIZED', first_name = 'User', password_hash = NULL, \
                 phone = NULL, city = NULL, address = NULL, active = FALSE, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Roles assigned to one user, most senior first.
    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, UserError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.code, r.name, r.description, r.hierarchy_level, r.active, \
                    r.created_at, r.updated_at \
             FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY r.hierarchy_level DESC, r.code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Roles for a whole page of users in one query, keyed by user id.
    pub async fn roles_for_users(&self, user_ids: &[Uuid]) -> Result<Vec<(Uuid, Role)>, UserError> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            "SELECT ur.user_id, r.id, r.code, r.name, r.description, r.hierarchy_level, \
                    r.active, r.created_at, r.updated_at \
             FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = ANY($1) \
             ORDER BY r.hierarchy_level DESC, r.code",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.user_id,
                    Role {
                        id: row.id,
                        code: row.code,
                        name: row.name,
                        description: row.description,
                        hierarchy_level: row.hierarchy_level,
                        active: row.active,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                )
            })
            .collect())
    }

    /// Replace a user's role assignments inside one transaction.
    ///
    /// Every requested role must exist; a missing one aborts the whole
    /// replacement.
    pub async fn set_roles(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
        assigned_by: Option<Uuid>,
    ) -> Result<(), UserError> {
        let known: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM roles WHERE id = ANY($1)")
            .bind(role_ids)
            .fetch_all(&self.pool)
            .await?;

        if let Some(missing) = role_ids.iter().find(|id| !known.contains(id)) {
            return Err(UserError::RoleNotFound(missing.to_string()));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for role_id in role_ids {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id, assigned_by) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(role_id)
            .bind(assigned_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Effective permission codes for one user: the whole catalog for a
    /// super_admin holder, otherwise the union over held roles.
    pub async fn effective_permission_codes(&self, user_id: Uuid) -> Result<Vec<String>, UserError> {
        let is_super: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(\
                 SELECT 1 FROM user_roles ur \
                 JOIN roles r ON r.id = ur.role_id \
                 WHERE ur.user_id = $1 AND r.code = $2)",
        )
        .bind(user_id)
        .bind(SUPER_ADMIN_ROLE)
        .fetch_one(&self.pool)
        .await?;

        let codes = if is_super.unwrap_or(false) {
            sqlx::query_scalar("SELECT code FROM permissions ORDER BY code")
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_scalar(
                "SELECT DISTINCT p.code \
                 FROM permissions p \
                 JOIN role_permissions rp ON rp.permission_id = p.id \
                 JOIN user_roles ur ON ur.role_id = rp.role_id \
                 WHERE ur.user_id = $1 \
                 ORDER BY p.code",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(codes)
    }
}
