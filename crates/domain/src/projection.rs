use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// Role together with the permissions joined to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    /// Aggregated role.
    #[serde(flatten)]
    pub role: Role,
    /// Granted permissions ordered by name.
    pub permissions: Vec<Permission>,
}

impl RoleWithPermissions {
    /// Returns granted permission names in display order.
    #[must_use]
    pub fn permission_names(&self) -> Vec<&str> {
        self.permissions
            .iter()
            .map(|permission| permission.name.as_str())
            .collect()
    }
}

/// Permission together with the roles granting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionWithRoles {
    /// Aggregated permission.
    #[serde(flatten)]
    pub permission: Permission,
    /// Granting roles ordered by name.
    pub roles: Vec<Role>,
}
