// User administration service - business logic layer

use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::auth::password;
use crate::models::{Role, User};
use crate::query::{Paginated, PaginationParams};
use crate::users::{
    error::UserError,
    models::{CreateUserRequest, UpdateUserRequest, UserWithRoles},
    repository::{UserFilter, UsersRepository},
};

/// Length of generated temporary passwords.
const TEMP_PASSWORD_LEN: usize = 16;

/// Service for user administration
#[derive(Clone)]
pub struct UserService {
    repo: UsersRepository,
}

impl UserService {
    pub fn new(repo: UsersRepository) -> Self {
        Self { repo }
    }

    /// One page of users with their assigned roles.
    pub async fn list(
        &self,
        filter: &UserFilter,
        pagination: &PaginationParams,
    ) -> Result<Paginated<UserWithRoles>, UserError> {
        let (users, total) = self.repo.list(filter, pagination).await?;

        let ids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
        let assignments = self.repo.roles_for_users(&ids).await?;

        let items = users
            .into_iter()
            .map(|user| {
                let roles: Vec<Role> = assignments
                    .iter()
                    .filter(|(user_id, _)| *user_id == user.id)
                    .map(|(_, role)| role.clone())
                    .collect();
                UserWithRoles {
                    user: user.into(),
                    roles,
                }
            })
            .collect();

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn get(&self, id: Uuid) -> Result<UserWithRoles, UserError> {
        let user = self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        let roles = self.repo.roles_of(id).await?;

        Ok(UserWithRoles {
            user: user.into(),
            roles,
        })
    }

    /// Create a user with a hashed password. Email must be unique.
    pub async fn create(&self, request: &CreateUserRequest) -> Result<User, UserError> {
        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(UserError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let password_hash =
            password::hash_password(&request.password).map_err(UserError::Auth)?;
        let user = self.repo.create(request, &password_hash).await?;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    /// Partial update; a changed email must stay unique.
    pub async fn update(&self, id: Uuid, request: &UpdateUserRequest) -> Result<User, UserError> {
        let current = self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

        if let Some(email) = &request.email {
            if email != &current.email && self.repo.find_by_email(email).await?.is_some() {
                return Err(UserError::Conflict(
                    "A user with this email already exists".to_string(),
                ));
            }
        }

        self.repo.update(&current, request).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), UserError> {
        if self.repo.delete(id).await? == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<User, UserError> {
        let current = self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        self.repo.set_active(id, !current.active).await
    }

    pub async fn roles_of(&self, id: Uuid) -> Result<Vec<Role>, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        self.repo.roles_of(id).await
    }

    /// Replace the user's role assignments, recording who assigned them.
    pub async fn set_roles(
        &self,
        id: Uuid,
        role_ids: &[Uuid],
        assigned_by: Uuid,
    ) -> Result<UserWithRoles, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        self.repo.set_roles(id, role_ids, Some(assigned_by)).await?;

        tracing::info!("Set {} role(s) on user {}", role_ids.len(), id);
        self.get(id).await
    }

    /// Generate a temporary password, store its hash and return the
    /// plaintext exactly once.
    pub async fn reset_password(&self, id: Uuid) -> Result<String, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

        let temp_password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TEMP_PASSWORD_LEN)
            .map(char::from)
            .collect();

        let hash = password::hash_password(&temp_password).map_err(UserError::Auth)?;
        self.repo.set_password(id, &hash).await?;

        tracing::info!("Reset password for user {}", id);
        Ok(temp_password)
    }

    pub async fn verify_email(&self, id: Uuid) -> Result<User, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        self.repo.set_email_verified(id).await
    }

    pub async fn effective_permissions(&self, id: Uuid) -> Result<Vec<String>, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;
        self.repo.effective_permission_codes(id).await
    }

    /// Scrub identifying data and deactivate the account.
    pub async fn anonymize(&self, id: Uuid) -> Result<User, UserError> {
        self.repo.find_by_id(id).await?.ok_or(UserError::NotFound)?;

        let user = self.repo.anonymize(id).await?;
        tracing::info!("Anonymized user {}", id);
        Ok(user)
    }
}
