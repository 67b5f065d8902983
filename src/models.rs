use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role code that bypasses explicit permission checks entirely.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Role codes that cannot be deleted through the admin API.
pub const SYSTEM_ROLE_CODES: &[&str] = &["super_admin", "admin", "user"];

/// User account row.
///
/// `password_hash` is `None` for accounts that have not been configured for
/// password login yet.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
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

/// Role row: a named permission bundle ordered by `hierarchy_level`
/// (higher = more senior).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub hierarchy_level: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission row: one atomic capability identified by an opaque dotted code
/// such as `"users.view"`. Codes are compared by equality only; there is no
/// wildcard or hierarchy matching.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A role together with the permissions it grants.
#[derive(Debug, Clone)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// A user materialized together with its complete role/permission graph.
///
/// The graph is loaded in a single query (see `auth::repository`), so the
/// predicates below never touch the database.
#[derive(Debug, Clone)]
pub struct UserWithAccess {
    pub user: User,
    pub roles: Vec<RoleWithPermissions>,
}

impl UserWithAccess {
    /// Whether the user holds a role with code `super_admin`.
    pub fn is_super_admin(&self) -> bool {
        self.roles.iter().any(|held| held.role.code == SUPER_ADMIN_ROLE)
    }

    /// Whether the user is granted the given permission code.
    ///
    /// Holding the `super_admin` role grants every permission regardless of
    /// that role's explicit permission set. The role's own `active` flag is
    /// not consulted here; only the administration listing endpoints filter
    /// on it.
    pub fn has_permission(&self, code: &str) -> bool {
        for held in &self.roles {
            if held.role.code == SUPER_ADMIN_ROLE {
                return true;
            }
            if held.permissions.iter().any(|perm| perm.code == code) {
                return true;
            }
        }
        false
    }

    /// Whether the user holds a role with the given code.
    pub fn has_role(&self, code: &str) -> bool {
        self.roles.iter().any(|held| held.role.code == code)
    }

    /// Highest `hierarchy_level` among held roles, or 0 with no roles.
    pub fn highest_role_level(&self) -> i32 {
        self.roles
            .iter()
            .map(|held| held.role.hierarchy_level)
            .max()
            .unwrap_or(0)
    }

    /// Distinct permission codes granted through held roles, sorted.
    ///
    /// Note: for super admins this lists only the explicitly granted codes;
    /// the full catalog lives in the database and is resolved by the user
    /// service when listing effective permissions.
    pub fn permission_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .roles
            .iter()
            .flat_map(|held| held.permissions.iter().map(|perm| perm.code.clone()))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(code: &str, level: i32, active: bool) -> Role {
        Role {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            hierarchy_level: level,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn permission(code: &str) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            category: None,
            created_at: Utc::now(),
        }
    }

    fn user_with_roles(roles: Vec<RoleWithPermissions>) -> UserWithAccess {
        UserWithAccess {
            user: User {
                id: Uuid::new_v4(),
                email: "test@example.com".to_string(),
                password_hash: None,
                last_name: "Doe".to_string(),
                first_name: "Jane".to_string(),
                phone: None,
                city: None,
                address: None,
                active: true,
                email_verified: true,
                last_login_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            roles,
        }
    }

    #[test]
    fn has_permission_finds_code_in_any_held_role() {
        let user = user_with_roles(vec![
            RoleWithPermissions {
                role: role("editor", 20, true),
                permissions: vec![permission("news.edit")],
            },
            RoleWithPermissions {
                role: role("viewer", 10, true),
                permissions: vec![permission("users.view")],
            },
        ]);

        assert!(user.has_permission("news.edit"));
        assert!(user.has_permission("users.view"));
        assert!(!user.has_permission("users.delete"));
    }

    #[test]
    fn super_admin_grants_everything_even_with_empty_permission_set() {
        let user = user_with_roles(vec![RoleWithPermissions {
            role: role("super_admin", 100, true),
            permissions: vec![],
        }]);

        assert!(user.has_permission("users.view"));
        assert!(user.has_permission("anything.at.all"));
        assert!(user.is_super_admin());
    }

    #[test]
    fn no_roles_means_no_permissions() {
        let user = user_with_roles(vec![]);

        assert!(!user.has_permission("users.view"));
        assert!(!user.is_super_admin());
    }

    #[test]
    fn membership_in_inactive_role_still_grants_its_permissions() {
        // The role's own active flag is not part of permission evaluation.
        let user = user_with_roles(vec![RoleWithPermissions {
            role: role("editor", 20, false),
            permissions: vec![permission("news.edit")],
        }]);

        assert!(user.has_permission("news.edit"));
        assert!(user.has_role("editor"));
    }

    #[test]
    fn has_role_matches_exact_code() {
        let user = user_with_roles(vec![RoleWithPermissions {
            role: role("admin", 80, true),
            permissions: vec![],
        }]);

        assert!(user.has_role("admin"));
        assert!(!user.has_role("admins"));
        assert!(!user.has_role("super_admin"));
    }

    #[test]
    fn highest_role_level_is_zero_without_roles() {
        let user = user_with_roles(vec![]);
        assert_eq!(user.highest_role_level(), 0);
    }

    #[test]
    fn highest_role_level_takes_the_maximum() {
        let user = user_with_roles(vec![
            RoleWithPermissions {
                role: role("user", 10, true),
                permissions: vec![],
            },
            RoleWithPermissions {
                role: role("admin", 80, true),
                permissions: vec![],
            },
        ]);

        assert_eq!(user.highest_role_level(), 80);
    }

    #[test]
    fn permission_codes_are_deduplicated_and_sorted() {
        let user = user_with_roles(vec![
            RoleWithPermissions {
                role: role("editor", 20, true),
                permissions: vec![permission("news.edit"), permission("news.view")],
            },
            RoleWithPermissions {
                role: role("viewer", 10, true),
                permissions: vec![permission("news.view")],
            },
        ]);

        assert_eq!(user.permission_codes(), vec!["news.edit", "news.view"]);
    }
}
