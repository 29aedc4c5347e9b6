//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod ids;
mod projection;
mod security;
mod user;

pub use ids::{PermissionId, RoleId, UserId};
pub use projection::{PermissionWithRoles, RoleWithPermissions};
pub use security::{
    Permission, PermissionDraft, PermissionPatch, Role, RoleDraft, RolePermission, UserRole,
};
pub use user::{Identity, UserPermissions, UserWithRoles};
