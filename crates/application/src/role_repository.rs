use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{Role, RoleDraft, RoleId};

use crate::repository_inputs::{CreateRoleInput, UpdateRoleInput};
use crate::rows::{decode_row, fetch, map_store_error};
use crate::store_ports::{Filter, Row, StoreAdapter, Table};

/// CRUD over role records.
#[derive(Clone)]
pub struct RoleRepository {
    store: Arc<dyn StoreAdapter>,
}

impl RoleRepository {
    /// Creates a repository over the provided store.
    #[must_use]
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    /// Lists roles ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> =
            fetch(self.store.as_ref(), Table::Roles, &Filter::all()).await?;
        roles.sort_by(Role::cmp_by_name);
        Ok(roles)
    }

    /// Returns one role by id.
    pub async fn get(&self, role_id: &RoleId) -> AppResult<Role> {
        self.find(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Returns one role by id, if it exists.
    pub async fn find(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        let roles: Vec<Role> =
            fetch(self.store.as_ref(), Table::Roles, &id_filter(role_id)).await?;
        Ok(roles.into_iter().next())
    }

    /// Creates a role.
    pub async fn create(&self, input: CreateRoleInput) -> AppResult<Role> {
        let draft = RoleDraft::new(input.name)?;

        let mut row = Row::new();
        row.insert("name".to_owned(), Value::from(draft.name().as_str()));

        let stored = self
            .store
            .insert(Table::Roles, vec![row])
            .await
            .map_err(|error| {
                map_store_error(error, &format!("role '{}' could not be created", draft.name()))
            })?;

        let row = stored.into_iter().next().ok_or_else(|| {
            AppError::Internal("store returned no row for created role".to_owned())
        })?;

        decode_row(Table::Roles, row)
    }

    /// Applies a partial update to a role.
    pub async fn update(&self, role_id: &RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let Some(name) = input.name else {
            return self.get(role_id).await;
        };
        let draft = RoleDraft::new(name)?;

        let mut row = Row::new();
        row.insert("name".to_owned(), Value::from(draft.name().as_str()));

        let updated = self
            .store
            .update(Table::Roles, &id_filter(role_id), row)
            .await
            .map_err(|error| {
                map_store_error(error, &format!("role '{role_id}' could not be updated"))
            })?;

        let row = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        decode_row(Table::Roles, row)
    }

    /// Deletes a role together with its grants and user assignments.
    ///
    /// Deleting an absent role succeeds without effect.
    pub async fn delete(&self, role_id: &RoleId) -> AppResult<()> {
        let junction_filter = Filter::all().eq("role_id", role_id.as_str());

        let grants_removed = self
            .store
            .delete(Table::RolePermissions, &junction_filter)
            .await
            .map_err(|error| {
                map_store_error(error, &format!("failed to remove grants of role '{role_id}'"))
            })?;

        let assignments_removed = self
            .store
            .delete(Table::UserRoles, &junction_filter)
            .await
            .map_err(|error| {
                map_store_error(
                    error,
                    &format!("failed to remove assignments of role '{role_id}'"),
                )
            })?;

        let roles_removed = self
            .store
            .delete(Table::Roles, &id_filter(role_id))
            .await
            .map_err(|error| {
                map_store_error(error, &format!("role '{role_id}' could not be deleted"))
            })?;

        debug!(
            role_id = %role_id,
            grants_removed,
            assignments_removed,
            roles_removed,
            "role deleted"
        );

        Ok(())
    }
}

fn id_filter(role_id: &RoleId) -> Filter {
    Filter::all().eq("id", role_id.as_str())
}
