use std::fmt;

use crate::{auth::AuthUser, error::ApiError, router::Action};

/// Permission
///
/// Access level an action demands. Shared by the viewsets and the standalone
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Anyone, including anonymous callers.
    Read,
    /// Any authenticated caller.
    Write,
    /// Callers whose role is `admin`.
    Admin,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        })
    }
}

pub fn has_permission(user: Option<&AuthUser>, permission: Permission) -> bool {
    match permission {
        Permission::Read => true,
        Permission::Write => user.is_some(),
        Permission::Admin => user.is_some_and(AuthUser::is_admin),
    }
}

/// require
///
/// Denies with 403 for a missing admin role and 401 for everything else.
pub fn require(user: Option<&AuthUser>, permission: Permission) -> Result<(), ApiError> {
    if has_permission(user, permission) {
        return Ok(());
    }

    tracing::warn!(
        required = %permission,
        user_id = ?user.map(|u| u.id),
        "permission denied"
    );

    match permission {
        Permission::Admin => Err(ApiError::Forbidden("Admin access required".to_string())),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Required permission for each viewset action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSetPermissions {
    pub list: Permission,
    pub create: Permission,
    pub retrieve: Permission,
    pub update: Permission,
    pub partial_update: Permission,
    pub destroy: Permission,
}

impl Default for ViewSetPermissions {
    /// Authenticated-or-read-only: reads are public, writes need a login.
    fn default() -> Self {
        Self {
            list: Permission::Read,
            create: Permission::Write,
            retrieve: Permission::Read,
            update: Permission::Write,
            partial_update: Permission::Write,
            destroy: Permission::Write,
        }
    }
}

impl ViewSetPermissions {
    pub fn admin_only() -> Self {
        Self {
            list: Permission::Admin,
            create: Permission::Admin,
            retrieve: Permission::Admin,
            update: Permission::Admin,
            partial_update: Permission::Admin,
            destroy: Permission::Admin,
        }
    }

    pub fn for_action(&self, action: Action) -> Permission {
        match action {
            Action::List => self.list,
            Action::Create => self.create,
            Action::Retrieve => self.retrieve,
            Action::Update => self.update,
            Action::PartialUpdate => self.partial_update,
            Action::Destroy => self.destroy,
        }
    }
}
