// Database repository for permission administration

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Permission, Role};
use crate::permissions::error::PermissionError;
use crate::permissions::models::{CreatePermissionRequest, UpdatePermissionRequest};
use crate::query::PaginationParams;

const PERMISSION_COLUMNS: &str = "id, code, name, description, category, created_at";

/// Listing filters for the permissions table.
#[derive(Debug, Default)]
pub struct PermissionFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Repository for permission administration
#[derive(Clone)]
pub struct PermissionsRepository {
    pool: PgPool,
}

impl PermissionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn base_query(select: &str, filter: &PermissionFilter) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {select} FROM permissions"));
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
        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }

        builder
    }

    /// One page of permissions ordered by category then code, plus the
    /// filtered total.
    pub async fn list(
        &self,
        filter: &PermissionFilter,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Permission>, i64), PermissionError> {
        let mut count = Self::base_query("COUNT(*)", filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = Self::base_query(PERMISSION_COLUMNS, filter);
        query.push(" ORDER BY category, code");
        query.push(" LIMIT ").push_bind(pagination.limit());
        query.push(" OFFSET ").push_bind(pagination.offset());

        let permissions = query
            .build_query_as::<Permission>()
            .fetch_all(&self.pool)
            .await?;
        Ok((permissions, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, PermissionError> {
        let query = format!("SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1");
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(permission)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Permission>, PermissionError> {
        let query = format!("SELECT {PERMISSION_COLUMNS} FROM permissions WHERE code = $1");
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(permission)
    }

    pub async fn create(
        &self,
        request: &CreatePermissionRequest,
    ) -> Result<Permission, PermissionError> {
        let query = format!(
            "INSERT INTO permissions (code, name, description, category) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PERMISSION_COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(&request.code)
            .bind(&request.name)
            .bind(&request.description)
            .bind(&request.category)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return PermissionError::Conflict(
                            "A permission with this code already exists".to_string(),
                        );
                    }
                }
                PermissionError::DatabaseError(e.to_string())
            })?;

        Ok(permission)
    }

    /// Update a permission, keeping current values for absent fields.
    pub async fn update(
        &self,
        current: &Permission,
        update: &UpdatePermissionRequest,
    ) -> Result<Permission, PermissionError> {
        let query = format!(
            "UPDATE permissions \
             SET code = $1, name = $2, description = $3, category = $4 \
             WHERE id = $5 \
             RETURNING {PERMISSION_COLUMNS}"
        );
        let permission = sqlx::query_as::<_, Permission>(&query)
            .bind(update.code.as_ref().unwrap_or(&current.code))
            .bind(update.name.as_ref().unwrap_or(&current.name))
            .bind(update.description.as_ref().or(current.description.as_ref()))
            .bind(update.category.as_ref().or(current.category.as_ref()))
            .bind(current.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(permission)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, PermissionError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Roles granting one permission, most senior first.
    pub async fn roles_of(&self, permission_id: Uuid) -> Result<Vec<Role>, PermissionError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.id, r.code, r.name, r.description, r.hierarchy_level, r.active, \
                    r.created_at, r.updated_at \
             FROM roles r \
             JOIN role_permissions rp ON rp.role_id = r.id \
             WHERE rp.permission_id = $1 \
             ORDER BY r.hierarchy_level DESC, r.code",
        )
        .bind(permission_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// All permissions ordered for the matrix.
    pub async fn all_ordered(&self) -> Result<Vec<Permission>, PermissionError> {
        let query = format!("SELECT {PERMISSION_COLUMNS} FROM permissions ORDER BY category, code");
        let permissions = sqlx::query_as::<_, Permission>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(permissions)
    }

    /// All roles ordered for the matrix, most senior first.
    pub async fn all_roles_ordered(&self) -> Result<Vec<Role>, PermissionError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, code, name, description, hierarchy_level, active, created_at, updated_at \
             FROM roles ORDER BY hierarchy_level DESC, code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Every (role, permission) grant pair.
    pub async fn all_grants(&self) -> Result<Vec<(Uuid, Uuid)>, PermissionError> {
        let grants = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT role_id, permission_id FROM role_permissions",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(grants)
    }
}
