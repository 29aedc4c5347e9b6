use super::*;

impl AssignmentEngine {
    /// Returns one role with its permissions ordered by name.
    pub async fn get_role_with_permissions(
        &self,
        role_id: &RoleId,
    ) -> AppResult<RoleWithPermissions> {
        let role = self.require_role(role_id).await?;
        let grants: Vec<RolePermission> = fetch(
            self.store.as_ref(),
            Table::RolePermissions,
            &Filter::all().eq("role_id", role_id.as_str()),
        )
        .await?;
        let catalog = self.permission_catalog().await?;

        Ok(RoleWithPermissions {
            role,
            permissions: resolve_permissions(
                grants.iter().map(|grant| &grant.permission_id),
                &catalog,
            ),
        })
    }

    /// Returns every role with its permissions.
    ///
    /// Roles are ordered by name and so are the nested permissions. The read
    /// costs three store fetches regardless of how many roles exist.
    pub async fn get_all_roles_with_permissions(&self) -> AppResult<Vec<RoleWithPermissions>> {
        let mut roles: Vec<Role> =
            fetch(self.store.as_ref(), Table::Roles, &Filter::all()).await?;
        let grants: Vec<RolePermission> =
            fetch(self.store.as_ref(), Table::RolePermissions, &Filter::all()).await?;
        let catalog = self.permission_catalog().await?;

        let mut grants_by_role: HashMap<RoleId, Vec<PermissionId>> = HashMap::new();
        for grant in grants {
            grants_by_role
                .entry(grant.role_id)
                .or_default()
                .push(grant.permission_id);
        }

        roles.sort_by(Role::cmp_by_name);
        Ok(roles
            .into_iter()
            .map(|role| {
                let permissions = grants_by_role
                    .get(&role.id)
                    .map(|ids| resolve_permissions(ids, &catalog))
                    .unwrap_or_default();
                RoleWithPermissions { role, permissions }
            })
            .collect())
    }

    /// Returns every directory identity with its roles.
    ///
    /// Directory order is preserved and users without roles are listed with
    /// an empty role set.
    pub async fn get_users_with_roles(&self) -> AppResult<Vec<UserWithRoles>> {
        let identities = self.identities().await?;
        let assignments: Vec<UserRole> =
            fetch(self.store.as_ref(), Table::UserRoles, &Filter::all()).await?;
        let catalog = self.role_catalog().await?;

        let mut roles_by_user: HashMap<UserId, Vec<RoleId>> = HashMap::new();
        for assignment in assignments {
            roles_by_user
                .entry(assignment.user_id)
                .or_default()
                .push(assignment.role_id);
        }

        Ok(identities
            .into_iter()
            .map(|identity| {
                let roles = roles_by_user
                    .get(&identity.id)
                    .map(|ids| resolve_roles(ids, &catalog))
                    .unwrap_or_default();
                UserWithRoles { identity, roles }
            })
            .collect())
    }

    /// Returns one permission with the roles granting it, ordered by name.
    pub async fn get_permission_with_roles(
        &self,
        permission_id: &PermissionId,
    ) -> AppResult<PermissionWithRoles> {
        let permission = self.require_permission(permission_id).await?;
        let grants: Vec<RolePermission> = fetch(
            self.store.as_ref(),
            Table::RolePermissions,
            &Filter::all().eq("permission_id", permission_id.as_str()),
        )
        .await?;
        let catalog = self.role_catalog().await?;

        Ok(PermissionWithRoles {
            permission,
            roles: resolve_roles(grants.iter().map(|grant| &grant.role_id), &catalog),
        })
    }

    /// Resolves the effective permissions of a user across all held roles.
    ///
    /// A user without assignments resolves to an empty set.
    pub async fn get_user_permissions(&self, user_id: &UserId) -> AppResult<UserPermissions> {
        let assignments: Vec<UserRole> = fetch(
            self.store.as_ref(),
            Table::UserRoles,
            &Filter::all().eq("user_id", user_id.as_str()),
        )
        .await?;

        if assignments.is_empty() {
            return Ok(UserPermissions {
                user_id: user_id.clone(),
                permissions: Vec::new(),
            });
        }

        let held: HashSet<RoleId> = assignments
            .into_iter()
            .map(|assignment| assignment.role_id)
            .collect();
        let grants: Vec<RolePermission> =
            fetch(self.store.as_ref(), Table::RolePermissions, &Filter::all()).await?;
        let catalog = self.permission_catalog().await?;

        Ok(UserPermissions {
            user_id: user_id.clone(),
            permissions: resolve_permissions(
                grants
                    .iter()
                    .filter(|grant| held.contains(&grant.role_id))
                    .map(|grant| &grant.permission_id),
                &catalog,
            ),
        })
    }

    /// Returns true when any role held by the user grants `permission_name`.
    pub async fn user_has_permission(
        &self,
        user_id: &UserId,
        permission_name: &str,
    ) -> AppResult<bool> {
        Ok(self
            .get_user_permissions(user_id)
            .await?
            .allows(permission_name))
    }
}
