//! Role/permission and user/role relation management.
//!
//! Membership changes are full-replace reconciliations: callers always
//! present the complete desired member set, and after a successful call the
//! stored junction rows equal that set exactly.
//!
//! Atomicity policy: when the store supports [`StoreAdapter::replace`] the
//! delete and insert steps run as one unit. Otherwise they run as two calls
//! and readers may briefly observe an empty membership; an interruption
//! between the two steps is reported as [`AppError::PartialWrite`] and the
//! caller retries the same call. Concurrent reconciliations of the same
//! target are last-write-wins.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use rolegrid_core::{AppError, AppResult, PartialWrite};
use rolegrid_domain::{
    Identity, Permission, PermissionId, PermissionWithRoles, Role, RoleId, RolePermission,
    RoleWithPermissions, UserId, UserPermissions, UserRole, UserWithRoles,
};

use crate::rows::{fetch, map_store_error};
use crate::store_ports::{Filter, Row, StoreAdapter, Table, UserDirectory};

mod projections;
mod reconcile;

#[cfg(test)]
mod tests;

/// Application service owning every junction-row write and aggregate read.
#[derive(Clone)]
pub struct AssignmentEngine {
    store: Arc<dyn StoreAdapter>,
    directory: Arc<dyn UserDirectory>,
}

impl AssignmentEngine {
    /// Creates an engine from required collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn StoreAdapter>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    async fn require_role(&self, role_id: &RoleId) -> AppResult<Role> {
        let roles: Vec<Role> = fetch(
            self.store.as_ref(),
            Table::Roles,
            &Filter::all().eq("id", role_id.as_str()),
        )
        .await?;

        roles
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    async fn require_permission(&self, permission_id: &PermissionId) -> AppResult<Permission> {
        let permissions: Vec<Permission> = fetch(
            self.store.as_ref(),
            Table::Permissions,
            &Filter::all().eq("id", permission_id.as_str()),
        )
        .await?;

        permissions.into_iter().next().ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' was not found"))
        })
    }

    async fn identities(&self) -> AppResult<Vec<Identity>> {
        self.directory
            .list_identities()
            .await
            .map_err(|error| map_store_error(error, "failed to list identities"))
    }

    async fn existing_ids(&self, table: Table) -> AppResult<HashSet<String>> {
        #[derive(Deserialize)]
        struct IdRow {
            id: String,
        }

        let rows: Vec<IdRow> = fetch(self.store.as_ref(), table, &Filter::all()).await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn permission_catalog(&self) -> AppResult<HashMap<PermissionId, Permission>> {
        let permissions: Vec<Permission> =
            fetch(self.store.as_ref(), Table::Permissions, &Filter::all()).await?;
        Ok(permissions
            .into_iter()
            .map(|permission| (permission.id.clone(), permission))
            .collect())
    }

    async fn role_catalog(&self) -> AppResult<HashMap<RoleId, Role>> {
        let roles: Vec<Role> = fetch(self.store.as_ref(), Table::Roles, &Filter::all()).await?;
        Ok(roles
            .into_iter()
            .map(|role| (role.id.clone(), role))
            .collect())
    }
}

/// Keeps the first occurrence of every id, preserving caller order.
fn distinct<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_owned)
        .collect()
}

/// Resolves ids against a catalog, dropping unknown and duplicate ids, ordered by name.
fn resolve_permissions<'a>(
    ids: impl IntoIterator<Item = &'a PermissionId>,
    catalog: &HashMap<PermissionId, Permission>,
) -> Vec<Permission> {
    let mut seen = HashSet::new();
    let mut permissions: Vec<Permission> = ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| catalog.get(id).cloned())
        .collect();
    permissions.sort_by(Permission::cmp_by_name);
    permissions
}

fn resolve_roles<'a>(
    ids: impl IntoIterator<Item = &'a RoleId>,
    catalog: &HashMap<RoleId, Role>,
) -> Vec<Role> {
    let mut seen = HashSet::new();
    let mut roles: Vec<Role> = ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| catalog.get(id).cloned())
        .collect();
    roles.sort_by(Role::cmp_by_name);
    roles
}
