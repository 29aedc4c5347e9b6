use super::*;

/// One full-replace of the member set owned by a role or user.
struct Reconciliation<'a> {
    table: Table,
    owner_column: &'static str,
    member_column: &'static str,
    owner_id: &'a str,
    members: Vec<String>,
}

impl Reconciliation<'_> {
    fn owner_filter(&self) -> Filter {
        Filter::all().eq(self.owner_column, self.owner_id)
    }

    fn rows(&self) -> Vec<Row> {
        self.members
            .iter()
            .map(|member| {
                let mut row = Row::new();
                row.insert(self.owner_column.to_owned(), self.owner_id.into());
                row.insert(self.member_column.to_owned(), member.as_str().into());
                row
            })
            .collect()
    }
}

impl AssignmentEngine {
    /// Replaces the permissions granted to a role with exactly `permission_ids`.
    ///
    /// Duplicate ids collapse to one grant. Fails with `NotFound` for an
    /// unknown role and with `Validation` naming the first unknown permission;
    /// in both cases existing grants are left untouched.
    pub async fn set_role_permissions(
        &self,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.require_role(role_id).await?;

        let members = distinct(permission_ids.iter().map(PermissionId::as_str));
        let known = self.existing_ids(Table::Permissions).await?;
        if let Some(missing) = members.iter().find(|id| !known.contains(id.as_str())) {
            return Err(AppError::Validation(format!(
                "permission '{missing}' does not exist"
            )));
        }

        self.reconcile(Reconciliation {
            table: Table::RolePermissions,
            owner_column: "role_id",
            member_column: "permission_id",
            owner_id: role_id.as_str(),
            members,
        })
        .await
    }

    /// Replaces the roles assigned to a user with exactly `role_ids`.
    ///
    /// Duplicate ids collapse to one assignment. Fails with `NotFound` for a
    /// user unknown to the directory and with `Validation` naming the first
    /// unknown role; in both cases existing assignments are left untouched.
    pub async fn set_user_roles(&self, user_id: &UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let identities = self.identities().await?;
        if !identities.iter().any(|identity| &identity.id == user_id) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' was not found"
            )));
        }

        let members = distinct(role_ids.iter().map(RoleId::as_str));
        let known = self.existing_ids(Table::Roles).await?;
        if let Some(missing) = members.iter().find(|id| !known.contains(id.as_str())) {
            return Err(AppError::Validation(format!(
                "role '{missing}' does not exist"
            )));
        }

        self.reconcile(Reconciliation {
            table: Table::UserRoles,
            owner_column: "user_id",
            member_column: "role_id",
            owner_id: user_id.as_str(),
            members,
        })
        .await
    }

    async fn reconcile(&self, plan: Reconciliation<'_>) -> AppResult<()> {
        let relation = plan.table.as_str();
        let filter = plan.owner_filter();
        let rows = plan.rows();

        match self.store.replace(plan.table, &filter, rows.clone()).await {
            Ok(Some(_)) => {
                debug!(
                    relation,
                    owner_id = plan.owner_id,
                    members = plan.members.len(),
                    "membership replaced atomically"
                );
                return Ok(());
            }
            Ok(None) => {}
            Err(error) => {
                return Err(map_store_error(
                    error,
                    &format!("failed to replace {relation} for '{}'", plan.owner_id),
                ));
            }
        }

        warn!(
            relation,
            owner_id = plan.owner_id,
            "store has no atomic replace, reconciling with separate delete and insert"
        );

        let removed = self.store.delete(plan.table, &filter).await.map_err(|error| {
            map_store_error(
                error,
                &format!("failed to clear {relation} for '{}'", plan.owner_id),
            )
        })?;

        if rows.is_empty() {
            debug!(relation, owner_id = plan.owner_id, removed, "membership cleared");
            return Ok(());
        }

        let Err(error) = self.store.insert(plan.table, rows).await else {
            debug!(
                relation,
                owner_id = plan.owner_id,
                removed,
                members = plan.members.len(),
                "membership replaced"
            );
            return Ok(());
        };

        let pending_ids = self.unconfirmed_members(&plan, &filter).await;
        if pending_ids.is_empty() {
            warn!(
                relation,
                owner_id = plan.owner_id,
                %error,
                "insert reported failure but every member is stored"
            );
            return Ok(());
        }

        warn!(
            relation,
            owner_id = plan.owner_id,
            pending = pending_ids.len(),
            %error,
            "membership reconciliation interrupted after delete"
        );

        Err(AppError::PartialWrite(PartialWrite {
            relation: relation.to_owned(),
            owner_id: plan.owner_id.to_owned(),
            pending_ids,
            detail: error.to_string(),
        }))
    }

    /// Desired members without a stored row; all of them if the store cannot be read.
    async fn unconfirmed_members(&self, plan: &Reconciliation<'_>, filter: &Filter) -> Vec<String> {
        let stored = match self.store.list(plan.table, filter).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!(
                    relation = plan.table.as_str(),
                    owner_id = plan.owner_id,
                    %error,
                    "could not confirm stored members"
                );
                return plan.members.clone();
            }
        };

        let confirmed: HashSet<&str> = stored
            .iter()
            .filter_map(|row| row.get(plan.member_column))
            .filter_map(|value| value.as_str())
            .collect();

        plan.members
            .iter()
            .filter(|member| !confirmed.contains(member.as_str()))
            .cloned()
            .collect()
    }
}
