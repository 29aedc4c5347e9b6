use rolegrid_application::{AssignmentEngine, PermissionRepository, RoleRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_repository: PermissionRepository,
    pub role_repository: RoleRepository,
    pub assignment_engine: AssignmentEngine,
    pub store_backend: &'static str,
}
