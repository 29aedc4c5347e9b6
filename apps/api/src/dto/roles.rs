use rolegrid_domain::{Role, RoleWithPermissions};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PermissionResponse;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
}

/// Incoming payload for role renames.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Incoming payload replacing the full permission set of a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-role-permissions-request.ts"
)]
pub struct SetRolePermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// API representation of a role without its grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// API representation of a role with its permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub permissions: Vec<PermissionResponse>,
}

impl From<Role> for RoleSummaryResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<RoleWithPermissions> for RoleResponse {
    fn from(value: RoleWithPermissions) -> Self {
        let RoleSummaryResponse {
            id,
            name,
            created_at,
        } = RoleSummaryResponse::from(value.role);

        Self {
            id,
            name,
            created_at,
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
