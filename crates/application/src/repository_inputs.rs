/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique capability name.
    pub name: String,
    /// Optional operator-facing explanation.
    pub description: Option<String>,
}

/// Partial update payload for permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description. An empty string clears it.
    pub description: Option<String>,
}

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
}

/// Partial update payload for roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Replacement name.
    pub name: Option<String>,
}
