use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use proptest::prelude::*;

use rolegrid_core::{AppError, StoreErrorKind};
use rolegrid_domain::{Permission, PermissionId, Role, RoleId, UserId};

use crate::repository_inputs::{CreatePermissionInput, CreateRoleInput};
use crate::store_ports::Table;
use crate::test_support::{FakeDirectory, FakeStore};
use crate::{PermissionRepository, RoleRepository};

use super::AssignmentEngine;

struct Fixture {
    store: Arc<FakeStore>,
    permissions: PermissionRepository,
    roles: RoleRepository,
    engine: AssignmentEngine,
}

fn fixture(store: FakeStore) -> Fixture {
    let store = Arc::new(store);
    Fixture {
        permissions: PermissionRepository::new(store.clone()),
        roles: RoleRepository::new(store.clone()),
        engine: AssignmentEngine::new(
            store.clone(),
            Arc::new(FakeDirectory::with_users(&["u1", "u2", "u3"])),
        ),
        store,
    }
}

impl Fixture {
    async fn permission(&self, name: &str) -> Permission {
        self.permissions
            .create(CreatePermissionInput {
                name: name.to_owned(),
                description: None,
            })
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    async fn role(&self, name: &str) -> Role {
        self.roles
            .create(CreateRoleInput {
                name: name.to_owned(),
            })
            .await
            .unwrap_or_else(|_| unreachable!())
    }

    async fn granted(&self, role_id: &RoleId) -> Vec<String> {
        self.engine
            .get_role_with_permissions(role_id)
            .await
            .unwrap_or_else(|_| unreachable!())
            .permissions
            .into_iter()
            .map(|permission| permission.name)
            .collect()
    }

    async fn stored_grant_ids(&self, role_id: &RoleId) -> BTreeSet<String> {
        self.store
            .rows(Table::RolePermissions)
            .await
            .into_iter()
            .filter(|row| row.get("role_id").and_then(|value| value.as_str()) == Some(role_id.as_str()))
            .filter_map(|row| {
                row.get("permission_id")
                    .and_then(|value| value.as_str())
                    .map(str::to_owned)
            })
            .collect()
    }
}

fn ids(permissions: &[&Permission]) -> Vec<PermissionId> {
    permissions
        .iter()
        .map(|permission| permission.id.clone())
        .collect()
}

#[tokio::test]
async fn editor_scenario_follows_desired_sets() {
    for store in [FakeStore::default(), FakeStore::atomic()] {
        let fixture = fixture(store);
        let edit = fixture.permission("edit:post").await;
        let delete = fixture.permission("delete:post").await;
        let editor = fixture.role("Editor").await;

        let first = fixture
            .engine
            .set_role_permissions(&editor.id, &ids(&[&edit]))
            .await;
        assert!(first.is_ok());
        assert_eq!(fixture.granted(&editor.id).await, vec!["edit:post"]);

        let second = fixture
            .engine
            .set_role_permissions(&editor.id, &ids(&[&edit, &delete]))
            .await;
        assert!(second.is_ok());
        assert_eq!(
            fixture.granted(&editor.id).await,
            vec!["delete:post", "edit:post"]
        );

        let cleared = fixture.engine.set_role_permissions(&editor.id, &[]).await;
        assert!(cleared.is_ok());
        assert!(fixture.granted(&editor.id).await.is_empty());
    }
}

#[tokio::test]
async fn set_role_permissions_is_idempotent() {
    let fixture = fixture(FakeStore::default());
    let read = fixture.permission("read:post").await;
    let write = fixture.permission("write:post").await;
    let role = fixture.role("Author").await;
    let desired = ids(&[&read, &write]);

    for _ in 0..2 {
        assert!(
            fixture
                .engine
                .set_role_permissions(&role.id, &desired)
                .await
                .is_ok()
        );
        assert_eq!(
            fixture.stored_grant_ids(&role.id).await,
            desired.iter().map(|id| id.as_str().to_owned()).collect()
        );
    }
}

#[tokio::test]
async fn set_role_permissions_replaces_instead_of_merging() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let b = fixture.permission("b").await;
    let c = fixture.permission("c").await;
    let role = fixture.role("R").await;

    assert!(
        fixture
            .engine
            .set_role_permissions(&role.id, &ids(&[&a, &b]))
            .await
            .is_ok()
    );
    assert!(
        fixture
            .engine
            .set_role_permissions(&role.id, &ids(&[&b, &c]))
            .await
            .is_ok()
    );

    assert_eq!(fixture.granted(&role.id).await, vec!["b", "c"]);
}

#[tokio::test]
async fn duplicate_desired_ids_collapse_to_one_grant() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let role = fixture.role("R").await;

    let result = fixture
        .engine
        .set_role_permissions(&role.id, &ids(&[&a, &a, &a]))
        .await;

    assert!(result.is_ok());
    assert_eq!(fixture.store.rows(Table::RolePermissions).await.len(), 1);
}

#[tokio::test]
async fn unknown_permission_is_rejected_without_touching_grants() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let role = fixture.role("R").await;
    assert!(
        fixture
            .engine
            .set_role_permissions(&role.id, &ids(&[&a]))
            .await
            .is_ok()
    );

    let result = fixture
        .engine
        .set_role_permissions(
            &role.id,
            &[
                a.id.clone(),
                PermissionId::new("ghost-1"),
                PermissionId::new("ghost-2"),
            ],
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("ghost-1")));
    assert_eq!(fixture.granted(&role.id).await, vec!["a"]);
}

#[tokio::test]
async fn unknown_role_is_not_found() {
    let fixture = fixture(FakeStore::default());
    let result = fixture
        .engine
        .set_role_permissions(&RoleId::new("missing"), &[])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn unknown_role_has_no_permission_projection() {
    let fixture = fixture(FakeStore::default());
    let result = fixture
        .engine
        .get_role_with_permissions(&RoleId::new("missing"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(message)) if message.contains("missing")));
}

#[tokio::test]
async fn failed_clear_is_a_plain_store_error_and_keeps_grants() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let b = fixture.permission("b").await;
    let role = fixture.role("R").await;
    assert!(
        fixture
            .engine
            .set_role_permissions(&role.id, &ids(&[&a]))
            .await
            .is_ok()
    );

    fixture.store.failing_deletes.store(true, Ordering::SeqCst);
    let result = fixture
        .engine
        .set_role_permissions(&role.id, &ids(&[&b]))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Store(error)) if error.kind == StoreErrorKind::Transport
    ));
    assert_eq!(fixture.granted(&role.id).await, vec!["a"]);
}

#[tokio::test]
async fn insert_error_with_every_member_stored_succeeds() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let b = fixture.permission("b").await;
    let role = fixture.role("R").await;

    fixture
        .store
        .inserts_lose_acknowledgement
        .store(true, Ordering::SeqCst);
    let result = fixture
        .engine
        .set_role_permissions(&role.id, &ids(&[&a, &b]))
        .await;

    assert!(result.is_ok());
    assert_eq!(fixture.granted(&role.id).await, vec!["a", "b"]);
}

#[tokio::test]
async fn interrupted_insert_reports_pending_members_and_retry_converges() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let b = fixture.permission("b").await;
    let role = fixture.role("R").await;
    let desired = ids(&[&a, &b]);

    fixture.store.failing_inserts.store(1, Ordering::SeqCst);
    let interrupted = fixture
        .engine
        .set_role_permissions(&role.id, &desired)
        .await;

    let Err(AppError::PartialWrite(partial)) = interrupted else {
        unreachable!("expected a partial write");
    };
    assert_eq!(partial.relation, "role_permissions");
    assert_eq!(partial.owner_id, role.id.as_str());
    assert_eq!(
        partial.pending_ids,
        vec![a.id.as_str().to_owned(), b.id.as_str().to_owned()]
    );
    assert!(fixture.granted(&role.id).await.is_empty());

    let retried = fixture
        .engine
        .set_role_permissions(&role.id, &desired)
        .await;
    assert!(retried.is_ok());
    assert_eq!(fixture.granted(&role.id).await, vec!["a", "b"]);
}

#[tokio::test]
async fn unreadable_store_reports_every_member_pending() {
    let fixture = fixture(FakeStore::default());
    let a = fixture.permission("a").await;
    let b = fixture.permission("b").await;
    let role = fixture.role("R").await;

    fixture.store.failing_inserts.store(1, Ordering::SeqCst);
    fixture
        .store
        .lists_fail_after_insert_failure
        .store(true, Ordering::SeqCst);
    let result = fixture
        .engine
        .set_role_permissions(&role.id, &ids(&[&b, &a]))
        .await;

    let Err(AppError::PartialWrite(partial)) = result else {
        unreachable!("expected a partial write");
    };
    assert_eq!(
        partial.pending_ids,
        vec![b.id.as_str().to_owned(), a.id.as_str().to_owned()]
    );
    assert!(partial.detail.contains("connection reset"));
}

#[tokio::test]
async fn atomic_store_never_reports_partial_writes() {
    let fixture = fixture(FakeStore::atomic());
    let a = fixture.permission("a").await;
    let role = fixture.role("R").await;

    fixture.store.failing_inserts.store(5, Ordering::SeqCst);
    let result = fixture
        .engine
        .set_role_permissions(&role.id, &ids(&[&a]))
        .await;

    assert!(result.is_ok());
    assert_eq!(fixture.granted(&role.id).await, vec!["a"]);
}

#[tokio::test]
async fn all_roles_are_ordered_by_name_with_ordered_permissions() {
    let fixture = fixture(FakeStore::default());
    let zeta = fixture.permission("zeta").await;
    let alpha = fixture.permission("alpha").await;
    let mid = fixture.permission("mid").await;
    let viewer = fixture.role("Viewer").await;
    let admin = fixture.role("Admin").await;
    let _empty = fixture.role("Moderator").await;

    assert!(
        fixture
            .engine
            .set_role_permissions(&viewer.id, &ids(&[&zeta, &alpha]))
            .await
            .is_ok()
    );
    assert!(
        fixture
            .engine
            .set_role_permissions(&admin.id, &ids(&[&mid, &zeta, &alpha]))
            .await
            .is_ok()
    );

    let listed = fixture
        .engine
        .get_all_roles_with_permissions()
        .await
        .unwrap_or_default();

    let summary: Vec<(String, Vec<&str>)> = listed
        .iter()
        .map(|entry| (entry.role.name.clone(), entry.permission_names()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Admin".to_owned(), vec!["alpha", "mid", "zeta"]),
            ("Moderator".to_owned(), Vec::new()),
            ("Viewer".to_owned(), vec!["alpha", "zeta"]),
        ]
    );
}

#[tokio::test]
async fn deleting_a_permission_removes_it_from_every_role() {
    let fixture = fixture(FakeStore::default());
    let shared = fixture.permission("shared").await;
    let other = fixture.permission("other").await;
    let first = fixture.role("First").await;
    let second = fixture.role("Second").await;
    for role in [&first, &second] {
        assert!(
            fixture
                .engine
                .set_role_permissions(&role.id, &ids(&[&shared, &other]))
                .await
                .is_ok()
        );
    }

    assert!(fixture.permissions.delete(&shared.id).await.is_ok());

    assert_eq!(fixture.granted(&first.id).await, vec!["other"]);
    assert_eq!(fixture.granted(&second.id).await, vec!["other"]);
    assert!(
        fixture
            .store
            .rows(Table::RolePermissions)
            .await
            .iter()
            .all(|row| row.get("permission_id").and_then(|value| value.as_str())
                != Some(shared.id.as_str()))
    );
}

#[tokio::test]
async fn deleting_an_assigned_role_leaves_user_listed_without_roles() {
    let fixture = fixture(FakeStore::default());
    let editor = fixture.role("Editor").await;
    let user = UserId::new("u1");
    assert!(
        fixture
            .engine
            .set_user_roles(&user, &[editor.id.clone()])
            .await
            .is_ok()
    );

    assert!(fixture.roles.delete(&editor.id).await.is_ok());

    let users = fixture
        .engine
        .get_users_with_roles()
        .await
        .unwrap_or_default();
    let listed = users
        .iter()
        .find(|entry| entry.identity.id == user)
        .unwrap_or_else(|| unreachable!());
    assert!(listed.roles.is_empty());
    assert!(fixture.store.rows(Table::UserRoles).await.is_empty());
}

#[tokio::test]
async fn users_keep_directory_order_and_sorted_roles() {
    let fixture = fixture(FakeStore::default());
    let viewer = fixture.role("Viewer").await;
    let admin = fixture.role("Admin").await;
    assert!(
        fixture
            .engine
            .set_user_roles(&UserId::new("u2"), &[viewer.id.clone(), admin.id.clone()])
            .await
            .is_ok()
    );

    let users = fixture
        .engine
        .get_users_with_roles()
        .await
        .unwrap_or_default();

    let listed: Vec<(&str, Vec<&str>)> = users
        .iter()
        .map(|entry| {
            (
                entry.identity.id.as_str(),
                entry.roles.iter().map(|role| role.name.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            ("u1", Vec::new()),
            ("u2", vec!["Admin", "Viewer"]),
            ("u3", Vec::new()),
        ]
    );
}

#[tokio::test]
async fn set_user_roles_validates_user_and_roles() {
    let fixture = fixture(FakeStore::default());
    let editor = fixture.role("Editor").await;

    let unknown_user = fixture
        .engine
        .set_user_roles(&UserId::new("nobody"), &[editor.id.clone()])
        .await;
    assert!(matches!(unknown_user, Err(AppError::NotFound(_))));

    let unknown_role = fixture
        .engine
        .set_user_roles(&UserId::new("u1"), &[RoleId::new("ghost")])
        .await;
    assert!(matches!(unknown_role, Err(AppError::Validation(message)) if message.contains("ghost")));
    assert!(fixture.store.rows(Table::UserRoles).await.is_empty());
}

#[tokio::test]
async fn effective_permissions_union_all_held_roles() {
    let fixture = fixture(FakeStore::default());
    let read = fixture.permission("read:post").await;
    let edit = fixture.permission("edit:post").await;
    let ban = fixture.permission("ban:user").await;
    let author = fixture.role("Author").await;
    let moderator = fixture.role("Moderator").await;
    assert!(
        fixture
            .engine
            .set_role_permissions(&author.id, &ids(&[&read, &edit]))
            .await
            .is_ok()
    );
    assert!(
        fixture
            .engine
            .set_role_permissions(&moderator.id, &ids(&[&read, &ban]))
            .await
            .is_ok()
    );
    let user = UserId::new("u3");
    assert!(
        fixture
            .engine
            .set_user_roles(&user, &[author.id.clone(), moderator.id.clone()])
            .await
            .is_ok()
    );

    let resolved = fixture
        .engine
        .get_user_permissions(&user)
        .await
        .unwrap_or_else(|_| unreachable!());
    let names: Vec<&str> = resolved
        .permissions
        .iter()
        .map(|permission| permission.name.as_str())
        .collect();
    assert_eq!(names, vec!["ban:user", "edit:post", "read:post"]);

    assert!(
        fixture
            .engine
            .user_has_permission(&user, "ban:user")
            .await
            .unwrap_or(false)
    );
    assert!(
        fixture
            .engine
            .set_user_roles(&user, &[author.id.clone()])
            .await
            .is_ok()
    );
    assert!(
        !fixture
            .engine
            .user_has_permission(&user, "ban:user")
            .await
            .unwrap_or(true)
    );
}

#[tokio::test]
async fn permission_with_roles_lists_granting_roles() {
    let fixture = fixture(FakeStore::default());
    let read = fixture.permission("read:post").await;
    let viewer = fixture.role("Viewer").await;
    let admin = fixture.role("Admin").await;
    let _other = fixture.role("Other").await;
    for role in [&viewer, &admin] {
        assert!(
            fixture
                .engine
                .set_role_permissions(&role.id, &ids(&[&read]))
                .await
                .is_ok()
        );
    }

    let aggregated = fixture
        .engine
        .get_permission_with_roles(&read.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let names: Vec<&str> = aggregated
        .roles
        .iter()
        .map(|role| role.name.as_str())
        .collect();
    assert_eq!(names, vec!["Admin", "Viewer"]);

    let missing = fixture
        .engine
        .get_permission_with_roles(&PermissionId::new("missing"))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn stored_grants_always_equal_the_last_desired_set(
        rounds in prop::collection::vec(prop::collection::vec(0usize..6, 0..8), 1..6)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap_or_else(|_| unreachable!());

        runtime.block_on(async {
            let fixture = fixture(FakeStore::default());
            let mut catalog = Vec::new();
            for index in 0..6 {
                catalog.push(fixture.permission(&format!("perm-{index}")).await);
            }
            let role = fixture.role("Subject").await;

            for round in &rounds {
                let desired: Vec<PermissionId> =
                    round.iter().map(|index| catalog[*index].id.clone()).collect();
                let result = fixture.engine.set_role_permissions(&role.id, &desired).await;
                prop_assert!(result.is_ok());

                let expected: BTreeSet<String> =
                    desired.iter().map(|id| id.as_str().to_owned()).collect();
                prop_assert_eq!(fixture.stored_grant_ids(&role.id).await, expected);
            }

            Ok(())
        })?;
    }
}
