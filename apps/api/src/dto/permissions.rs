use rolegrid_domain::{Permission, PermissionWithRoles};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::RoleSummaryResponse;

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Incoming payload for partial permission updates.
///
/// An empty `description` clears the stored description.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// API representation of a permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// API representation of a permission with the roles granting it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-with-roles-response.ts"
)]
pub struct PermissionWithRolesResponse {
    #[serde(flatten)]
    pub permission: PermissionResponse,
    pub roles: Vec<RoleSummaryResponse>,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

impl From<PermissionWithRoles> for PermissionWithRolesResponse {
    fn from(value: PermissionWithRoles) -> Self {
        Self {
            permission: PermissionResponse::from(value.permission),
            roles: value
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
        }
    }
}
