// Database repository for role administration

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Permission, Role, User};
use crate::query::PaginationParams;
use crate::roles::error::RoleError;
use crate::roles::models::{CreateRoleRequest, UpdateRoleRequest};

const ROLE_COLUMNS: &str =
    "id, code, name, description, hierarchy_level, active, created_at, updated_at";

/// Listing filters for the roles table.
#[derive(Debug, Default)]
pub struct RoleFilter {
    pub search: Option<String>,
    pub active: Option<bool>,
}

/// Repository for role administration
#[derive(Clone)]
pub struct RolesRepository {
    pool: PgPool,
}

impl RolesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn base_query(select: &str, filter: &RoleFilter) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {select} FROM roles"));
        builder.push(" WHERE TRUE");

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(active) = filter.active {
            builder.push(" AND active = ").push_bind(active);
        }

        builder
    }

    /// One page of roles, most senior first, plus the filtered total.
    pub async fn list(
        &self,
        filter: &RoleFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Role>, i64), RoleError> {
        let mut count = Self::base_query("COUNT(*)", filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = Self::base_query(ROLE_COLUMNS, filter);
        query.push(" ORDER BY hierarchy_level DESC, code");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let roles = query.build_query_as::<Role>().fetch_all(&self.pool).await?;
        Ok((roles, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, RoleError> {
        let query = format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1");
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Role>, RoleError> {
        let query = format!("SELECT {ROLE_COLUMNS} FROM roles WHERE code = $1");
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn create(&self, request: &CreateRoleRequest) -> Result<Role, RoleError> {
        let query = format!(
            "INSERT INTO roles (code, name, description, hierarchy_level, active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ROLE_COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&request.code)
            .bind(&request.name)
            .bind(&request.description)
            .bind(request.hierarchy_level.unwrap_or(0))
            .bind(request.active.unwrap_or(true))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return RoleError::Conflict(
                            "A role with this code already exists".to_string(),
                        );
                    }
                }
                RoleError::DatabaseError(e.to_string())
            })?;

        Ok(role)
    }

    /// Update a role, keeping current values for absent fields.
    pub async fn update(
        &self,
        current: &Role,
        update: &UpdateRoleRequest,
    ) -> Result<Role, RoleError> {
        let query = format!(
            "UPDATE roles \
             SET code = $1, name = $2, description = $3, hierarchy_level = $4, active = $5, \
                 updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {ROLE_COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(update.code.as_ref().unwrap_or(&current.code))
            .bind(update.name.as_ref().unwrap_or(&current.name))
            .bind(update.description.as_ref().or(current.description.as_ref()))
            .bind(update.hierarchy_level.unwrap_or(current.hierarchy_level))
            .bind(update.active.unwrap_or(current.active))
            .bind(current.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, RoleError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<Role, RoleError> {
        let query = format!(
            "UPDATE roles SET active = $1, updated_at = NOW() WHERE id = $2 RETURNING {ROLE_COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(active)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(role)
    }

    /// Permissions granted by one role.
    pub async fn permissions_of(&self, role_id: Uuid) -> Result<Vec<Permission>, RoleError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.code, p.name, p.description, p.category, p.created_at \
             FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 \
             ORDER BY p.category, p.code",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    /// Copy a role and its permission grants inside one transaction.
    pub async fn duplicate(
        &self,
        source: &Role,
        code: &str,
        name: &str,
    ) -> Result<Role, RoleError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (code, name, description, hierarchy_level, active) \
             VALUES ($1, $2, $3, $4, TRUE) \
             RETURNING {ROLE_COLUMNS}"
        );
        let copy = sqlx::query_as::<_, Role>(&query)
            .bind(code)
            .bind(name)
            .bind(&source.description)
            .bind(source.hierarchy_level)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT $1, permission_id FROM role_permissions WHERE role_id = $2",
        )
        .bind(copy.id)
        .bind(source.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(copy)
    }

    /// Replace a role's permission grants inside one transaction.
    ///
    /// Every requested permission must exist; a missing one aborts the whole
    /// replacement.
    pub async fn set_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), RoleError> {
        let known: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM permissions WHERE id = ANY($1)")
            .bind(permission_ids)
            .fetch_all(&self.pool)
            .await?;

        if let Some(missing) = permission_ids.iter().find(|id| !known.contains(id)) {
            return Err(RoleError::PermissionNotFound(missing.to_string()));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        for permission_id in permission_ids {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Users holding one role.
    pub async fn users_of(&self, role_id: Uuid) -> Result<Vec<User>, RoleError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.last_name, u.first_name, u.phone, \
                    u.city, u.address, u.active, u.email_verified, u.last_login_at, \
                    u.created_at, u.updated_at \
             FROM users u \
             JOIN user_roles ur ON ur.user_id = u.id \
             WHERE ur.role_id = $1 \
             ORDER BY u.last_name, u.first_name",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
