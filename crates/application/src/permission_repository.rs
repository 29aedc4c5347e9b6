use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{Permission, PermissionDraft, PermissionId, PermissionPatch};

use crate::repository_inputs::{CreatePermissionInput, UpdatePermissionInput};
use crate::rows::{decode_row, fetch, map_store_error};
use crate::store_ports::{Filter, Row, StoreAdapter, Table};

/// CRUD over permission records.
#[derive(Clone)]
pub struct PermissionRepository {
    store: Arc<dyn StoreAdapter>,
}

impl PermissionRepository {
    /// Creates a repository over the provided store.
    #[must_use]
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    /// Lists permissions ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> =
            fetch(self.store.as_ref(), Table::Permissions, &Filter::all()).await?;
        permissions.sort_by(Permission::cmp_by_name);
        Ok(permissions)
    }

    /// Returns one permission by id.
    pub async fn get(&self, permission_id: &PermissionId) -> AppResult<Permission> {
        self.find(permission_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' was not found"))
        })
    }

    /// Returns one permission by id, if it exists.
    pub async fn find(&self, permission_id: &PermissionId) -> AppResult<Option<Permission>> {
        let permissions: Vec<Permission> = fetch(
            self.store.as_ref(),
            Table::Permissions,
            &id_filter(permission_id),
        )
        .await?;

        Ok(permissions.into_iter().next())
    }

    /// Creates a permission.
    pub async fn create(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let draft = PermissionDraft::new(input.name, input.description)?;

        let mut row = Row::new();
        row.insert("name".to_owned(), Value::from(draft.name().as_str()));
        row.insert(
            "description".to_owned(),
            draft.description().map_or(Value::Null, Value::from),
        );

        let stored = self
            .store
            .insert(Table::Permissions, vec![row])
            .await
            .map_err(|error| {
                map_store_error(
                    error,
                    &format!("permission '{}' could not be created", draft.name()),
                )
            })?;

        let row = stored.into_iter().next().ok_or_else(|| {
            AppError::Internal("store returned no row for created permission".to_owned())
        })?;

        decode_row(Table::Permissions, row)
    }

    /// Applies a partial update to a permission.
    pub async fn update(
        &self,
        permission_id: &PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let patch = PermissionPatch::new(input.name, input.description)?;
        if patch.is_empty() {
            return self.get(permission_id).await;
        }

        let mut row = Row::new();
        if let Some(name) = patch.name() {
            row.insert("name".to_owned(), Value::from(name.as_str()));
        }
        if let Some(description) = patch.description() {
            row.insert(
                "description".to_owned(),
                description.map_or(Value::Null, Value::from),
            );
        }

        let updated = self
            .store
            .update(Table::Permissions, &id_filter(permission_id), row)
            .await
            .map_err(|error| {
                map_store_error(
                    error,
                    &format!("permission '{permission_id}' could not be updated"),
                )
            })?;

        let row = updated.into_iter().next().ok_or_else(|| {
            AppError::NotFound(format!("permission '{permission_id}' was not found"))
        })?;

        decode_row(Table::Permissions, row)
    }

    /// Deletes a permission and every role grant referencing it.
    ///
    /// Deleting an absent permission succeeds without effect.
    pub async fn delete(&self, permission_id: &PermissionId) -> AppResult<()> {
        let grants_removed = self
            .store
            .delete(
                Table::RolePermissions,
                &Filter::all().eq("permission_id", permission_id.as_str()),
            )
            .await
            .map_err(|error| {
                map_store_error(
                    error,
                    &format!("failed to remove grants of permission '{permission_id}'"),
                )
            })?;

        let permissions_removed = self
            .store
            .delete(Table::Permissions, &id_filter(permission_id))
            .await
            .map_err(|error| {
                map_store_error(
                    error,
                    &format!("permission '{permission_id}' could not be deleted"),
                )
            })?;

        debug!(
            permission_id = %permission_id,
            grants_removed,
            permissions_removed,
            "permission deleted"
        );

        Ok(())
    }
}

fn id_filter(permission_id: &PermissionId) -> Filter {
    Filter::all().eq("id", permission_id.as_str())
}
