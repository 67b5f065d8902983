// Role administration service - business logic layer

use uuid::Uuid;

use crate::models::{Role, User, SYSTEM_ROLE_CODES};
use crate::query::{Paginated, PaginationParams};
use crate::roles::{
    error::RoleError,
    models::{CreateRoleRequest, DuplicateRoleRequest, RoleWithPermissionsResponse, UpdateRoleRequest},
    repository::{RoleFilter, RolesRepository},
};

/// Service for role administration
#[derive(Clone)]
pub struct RoleService {
    repo: RolesRepository,
}

impl RoleService {
    pub fn new(repo: RolesRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filter: &RoleFilter,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Role>, RoleError> {
        let (roles, total) = self.repo.list(filter, pagination).await?;
        Ok(Paginated::new(roles, total, pagination))
    }

    pub async fn get(&self, id: Uuid) -> Result<RoleWithPermissionsResponse, RoleError> {
        let role = self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;
        let permissions = self.repo.permissions_of(id).await?;

        Ok(RoleWithPermissionsResponse { role, permissions })
    }

    /// Create a role; its code must be unique.
    pub async fn create(&self, request: &CreateRoleRequest) -> Result<Role, RoleError> {
        if self.repo.find_by_code(&request.code).await?.is_some() {
            return Err(RoleError::Conflict(
                "A role with this code already exists".to_string(),
            ));
        }

        let role = self.repo.create(request).await?;
        tracing::info!("Created role {} ({})", role.code, role.id);
        Ok(role)
    }

    /// Partial update; a changed code must stay unique.
    pub async fn update(&self, id: Uuid, request: &UpdateRoleRequest) -> Result<Role, RoleError> {
        let current = self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;

        if let Some(code) = &request.code {
            if code != &current.code && self.repo.find_by_code(code).await?.is_some() {
                return Err(RoleError::Conflict(
                    "A role with this code already exists".to_string(),
                ));
            }
        }

        self.repo.update(&current, request).await
    }

    /// Delete a role. System roles are protected.
    pub async fn delete(&self, id: Uuid) -> Result<(), RoleError> {
        let role = self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;

        if SYSTEM_ROLE_CODES.contains(&role.code.as_str()) {
            return Err(RoleError::Conflict(
                "System roles cannot be deleted".to_string(),
            ));
        }

        self.repo.delete(id).await?;
        tracing::info!("Deleted role {} ({})", role.code, id);
        Ok(())
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Role, RoleError> {
        let current = self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;
        self.repo.set_active(id, !current.active).await
    }

    /// Copy a role together with its permission grants under a new code.
    pub async fn duplicate(
        &self,
        id: Uuid,
        request: &DuplicateRoleRequest,
    ) -> Result<RoleWithPermissionsResponse, RoleError> {
        let source = self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;

        if self.repo.find_by_code(&request.code).await?.is_some() {
            return Err(RoleError::Conflict(
                "A role with this code already exists".to_string(),
            ));
        }

        let copy = self
            .repo
            .duplicate(&source, &request.code, &request.name)
            .await?;
        tracing::info!("Duplicated role {} as {}", source.code, copy.code);

        self.get(copy.id).await
    }

    pub async fn permissions_of(&self, id: Uuid) -> Result<Vec<crate::models::Permission>, RoleError> {
        self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;
        self.repo.permissions_of(id).await
    }

    /// Replace the role's permission grants.
    pub async fn set_permissions(
        &self,
        id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<RoleWithPermissionsResponse, RoleError> {
        self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;
        self.repo.set_permissions(id, permission_ids).await?;

        tracing::info!("Set {} permission(s) on role {}", permission_ids.len(), id);
        self.get(id).await
    }

    pub async fn users_of(&self, id: Uuid) -> Result<Vec<User>, RoleError> {
        self.repo.find_by_id(id).await?.ok_or(RoleError::NotFound)?;
        self.repo.users_of(id).await
    }
}
