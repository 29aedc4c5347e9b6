use rolegrid_domain::{UserPermissions, UserWithRoles};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{PermissionResponse, RoleSummaryResponse};

/// Incoming payload replacing the full role set of a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-user-roles-request.ts"
)]
pub struct SetUserRolesRequest {
    pub role_ids: Vec<String>,
}

/// API representation of a directory user with assigned roles.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub created_at: String,
    pub roles: Vec<RoleSummaryResponse>,
}

/// API representation of a user's effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-permissions-response.ts"
)]
pub struct UserPermissionsResponse {
    pub user_id: String,
    pub permissions: Vec<PermissionResponse>,
}

/// Answer to whether a user effectively holds one named permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub user_id: String,
    pub permission: String,
    pub allowed: bool,
}

impl From<UserWithRoles> for UserResponse {
    fn from(value: UserWithRoles) -> Self {
        Self {
            id: value.identity.id.into(),
            email: value.identity.email,
            created_at: value.identity.created_at.to_rfc3339(),
            roles: value
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
        }
    }
}

impl From<UserPermissions> for UserPermissionsResponse {
    fn from(value: UserPermissions) -> Self {
        Self {
            user_id: value.user_id.into(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}
