// Permission administration service - business logic layer

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::models::{Permission, Role};
use crate::permissions::{
    error::PermissionError,
    models::{
        CreatePermissionRequest, MatrixEntry, MatrixRole, PermissionMatrix,
        UpdatePermissionRequest,
    },
    repository::{PermissionFilter, PermissionsRepository},
};
use crate::query::{Paginated, PaginationParams};

/// Service for permission administration
#[derive(Clone)]
pub struct PermissionService {
    repo: PermissionsRepository,
}

impl PermissionService {
    pub fn new(repo: PermissionsRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        filter: &PermissionFilter,
        pagination: &PaginationParams,
    ) -> Result<Paginated<Permission>, PermissionError> {
        let (permissions, total) = self.repo.list(filter, pagination).await?;
        Ok(Paginated::new(permissions, total, pagination))
    }

    pub async fn get(&self, id: Uuid) -> Result<Permission, PermissionError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound)
    }

    /// Create a permission; its code must be unique.
    pub async fn create(
        &self,
        request: &CreatePermissionRequest,
    ) -> Result<Permission, PermissionError> {
        if self.repo.find_by_code(&request.code).await?.is_some() {
            return Err(PermissionError::Conflict(
                "A permission with this code already exists".to_string(),
            ));
        }

        let permission = self.repo.create(request).await?;
        tracing::info!("Created permission {} ({})", permission.code, permission.id);
        Ok(permission)
    }

    /// Partial update; a changed code must stay unique.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdatePermissionRequest,
    ) -> Result<Permission, PermissionError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound)?;

        if let Some(code) = &request.code {
            if code != &current.code && self.repo.find_by_code(code).await?.is_some() {
                return Err(PermissionError::Conflict(
                    "A permission with this code already exists".to_string(),
                ));
            }
        }

        self.repo.update(&current, request).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PermissionError> {
        if self.repo.delete(id).await? == 0 {
            return Err(PermissionError::NotFound);
        }

        tracing::info!("Deleted permission {}", id);
        Ok(())
    }

    pub async fn roles_of(&self, id: Uuid) -> Result<Vec<Role>, PermissionError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(PermissionError::NotFound)?;
        self.repo.roles_of(id).await
    }

    /// Assemble the permission-by-role matrix: for every permission, which
    /// role codes grant it explicitly. The super_admin bypass is a runtime
    /// rule and intentionally not reflected here.
    pub async fn matrix(&self) -> Result<PermissionMatrix, PermissionError> {
        let permissions = self.repo.all_ordered().await?;
        let roles = self.repo.all_roles_ordered().await?;
        let grants: HashSet<(Uuid, Uuid)> = self.repo.all_grants().await?.into_iter().collect();

        let entries = permissions
            .into_iter()
            .map(|permission| {
                let mut by_role = BTreeMap::new();
                for role in &roles {
                    by_role.insert(
                        role.code.clone(),
                        grants.contains(&(role.id, permission.id)),
                    );
                }
                MatrixEntry {
                    id: permission.id,
                    code: permission.code,
                    name: permission.name,
                    category: permission.category,
                    roles: by_role,
                }
            })
            .collect();

        let role_columns = roles
            .into_iter()
            .map(|role| MatrixRole {
                id: role.id,
                code: role.code,
                name: role.name,
            })
            .collect();

        Ok(PermissionMatrix {
            permissions: entries,
            roles: role_columns,
        })
    }
}
