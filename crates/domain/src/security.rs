use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rolegrid_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId, UserId};

/// Named capability that can be granted through roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Store-assigned identifier.
    pub id: PermissionId,
    /// Capability name, for example `edit:post`.
    pub name: String,
    /// Optional operator-facing explanation.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Orders permissions by name ignoring case, then exact name, then id.
    #[must_use]
    pub fn cmp_by_name(left: &Self, right: &Self) -> Ordering {
        cmp_names(&left.name, &right.name).then_with(|| left.id.cmp(&right.id))
    }
}

/// Named bag of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Store-assigned identifier.
    pub id: RoleId,
    /// Role name, for example `Editor`.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Orders roles by name ignoring case, then exact name, then id.
    #[must_use]
    pub fn cmp_by_name(left: &Self, right: &Self) -> Ordering {
        cmp_names(&left.name, &right.name).then_with(|| left.id.cmp(&right.id))
    }
}

/// Junction row granting a permission to a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    /// Granting role.
    pub role_id: RoleId,
    /// Granted permission.
    pub permission_id: PermissionId,
}

/// Junction row assigning a role to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole {
    /// Assigned user.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
}

/// Validated input for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDraft {
    name: NonEmptyString,
    description: Option<String>,
}

impl PermissionDraft {
    /// Validates the name and normalizes the description.
    ///
    /// A blank description is treated as absent.
    pub fn new(name: impl Into<String>, description: Option<String>) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            description: normalize_description(description),
        })
    }

    /// Returns the trimmed permission name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the normalized description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Validated partial update for a permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPatch {
    name: Option<NonEmptyString>,
    description: Option<Option<String>>,
}

impl PermissionPatch {
    /// Validates a partial update.
    ///
    /// `description: Some("")` clears the stored description; `None` leaves it
    /// untouched.
    pub fn new(name: Option<String>, description: Option<String>) -> AppResult<Self> {
        Ok(Self {
            name: name.map(NonEmptyString::new).transpose()?,
            description: description.map(|value| normalize_description(Some(value))),
        })
    }

    /// Returns the replacement name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&NonEmptyString> {
        self.name.as_ref()
    }

    /// Returns the description change: outer `None` means unchanged.
    #[must_use]
    pub fn description(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(Option::as_deref)
    }

    /// Returns true when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Validated input for creating or renaming a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    name: NonEmptyString,
}

impl RoleDraft {
    /// Validates the role name.
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the trimmed role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }
}

/// Case-insensitive name order; names differing only in case fall back to byte order.
fn cmp_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
