use async_trait::async_trait;
use serde_json::{Map, Value};

use rolegrid_core::StoreError;
use rolegrid_domain::Identity;

/// Stored record as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Result type returned by external collaborator ports.
pub type StoreResult<T> = Result<T, StoreError>;

/// Tables reachable through the store adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Permission records.
    Permissions,
    /// Role records.
    Roles,
    /// Role to permission junction rows.
    RolePermissions,
    /// User to role junction rows.
    UserRoles,
}

impl Table {
    /// Returns the stable storage name of the table.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permissions => "permissions",
            Self::Roles => "roles",
            Self::RolePermissions => "role_permissions",
            Self::UserRoles => "user_roles",
        }
    }

    /// Returns the columns a caller may write or filter on.
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Permissions => &["id", "name", "description", "created_at"],
            Self::Roles => &["id", "name", "created_at"],
            Self::RolePermissions => &["role_id", "permission_id"],
            Self::UserRoles => &["user_id", "role_id"],
        }
    }

    /// Returns true for tables whose rows get a generated `id` and `created_at`.
    #[must_use]
    pub fn has_generated_identity(&self) -> bool {
        matches!(self, Self::Permissions | Self::Roles)
    }

    /// Returns the column sets that must be unique across rows.
    #[must_use]
    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Permissions | Self::Roles => &[&["id"], &["name"]],
            Self::RolePermissions => &[&["role_id", "permission_id"]],
            Self::UserRoles => &[&["user_id", "role_id"]],
        }
    }
}

/// Conjunction of column equality conditions.
///
/// An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// Creates a filter that matches every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a `column = value` condition.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// Returns the configured conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[(String, Value)] {
        self.conditions.as_slice()
    }

    /// Evaluates the filter against one row.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column).unwrap_or(&Value::Null) == expected)
    }
}

/// Narrow record store port used by repositories and the assignment engine.
///
/// Implementations never cache: every call reaches the backing store.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Lists rows matching the filter.
    async fn list(&self, table: Table, filter: &Filter) -> StoreResult<Vec<Row>>;

    /// Inserts rows and returns them as stored, including generated columns.
    async fn insert(&self, table: Table, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Applies a patch to matching rows and returns the updated rows.
    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> StoreResult<Vec<Row>>;

    /// Deletes matching rows and returns the number removed.
    async fn delete(&self, table: Table, filter: &Filter) -> StoreResult<u64>;

    /// Deletes matching rows and inserts `rows` as one atomic unit.
    ///
    /// Returns `Ok(None)` when the store cannot make the pair atomic; callers
    /// then issue `delete` and `insert` separately.
    async fn replace(
        &self,
        _table: Table,
        _filter: &Filter,
        _rows: Vec<Row>,
    ) -> StoreResult<Option<Vec<Row>>> {
        Ok(None)
    }
}

/// Read-only port onto the identity subsystem.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Lists known identities in directory order.
    async fn list_identities(&self) -> StoreResult<Vec<Identity>>;
}
