mod common;
mod permissions;
mod roles;
mod users;

pub use common::HealthResponse;
pub use permissions::{
    CreatePermissionRequest, PermissionResponse, PermissionWithRolesResponse,
    UpdatePermissionRequest,
};
pub use roles::{
    CreateRoleRequest, RoleResponse, RoleSummaryResponse, SetRolePermissionsRequest,
    UpdateRoleRequest,
};
pub use users::{
    PermissionCheckResponse, SetUserRolesRequest, UserPermissionsResponse, UserResponse,
};
