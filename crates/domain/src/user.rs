//! User-side types. Users belong to the identity subsystem; this crate only
//! reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Permission, Role, UserId};

/// Identity listed by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity-subsystem user identifier.
    pub id: UserId,
    /// Email address, when the identity provider has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Identity together with the roles currently assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithRoles {
    /// Listed identity.
    #[serde(flatten)]
    pub identity: Identity,
    /// Assigned roles ordered by name. Empty when the user holds none.
    pub roles: Vec<Role>,
}

/// Effective permission set of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    /// Resolved user.
    pub user_id: UserId,
    /// Union of permissions over all held roles, deduplicated and ordered by name.
    pub permissions: Vec<Permission>,
}

impl UserPermissions {
    /// Returns true when a permission with this exact name is granted.
    #[must_use]
    pub fn allows(&self, permission_name: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.name == permission_name)
    }
}
