//! End-to-end authorization flows over the in-memory store

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use admin_server::db::RepoError;
use shared::error::ErrorCode;
use shared::models::{DataScope, User};

use common::*;

fn ids(values: &[i64]) -> BTreeSet<i64> {
    values.iter().copied().collect()
}

#[tokio::test]
async fn test_most_permissive_role_wins() {
    let store = seeded_store();
    store.grant_role(2, ROLE_DEPT);
    store.grant_role(2, ROLE_ALL);
    let state = state_with(store);

    let scope = &state.authz.data_scope;
    assert_eq!(scope.effective_scope(2).await, Some(DataScope::All));
    assert_eq!(
        scope.resolve_accessible_departments(2).await,
        ids(&[100, 101, 102, 103])
    );
}

#[tokio::test]
async fn test_department_and_below_covers_subtree() {
    let store = seeded_store();
    store.grant_role(2, ROLE_BELOW);
    let state = state_with(store);

    let scope = &state.authz.data_scope;
    assert_eq!(scope.resolve_accessible_departments(2).await, ids(&[101, 102]));
    assert!(scope.ensure_department_accessible(2, 102).await.is_ok());

    let err = scope
        .ensure_department_accessible(2, 103)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DataScopeDenied);
}

#[tokio::test]
async fn test_custom_scope_uses_role_grants() {
    let store = seeded_store();
    store.grant_role(2, ROLE_CUSTOM);
    let state = state_with(store);

    assert_eq!(
        state.authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[103])
    );
}

#[tokio::test]
async fn test_self_scope_adds_owner_check() {
    let store = seeded_store();
    store.grant_role(2, ROLE_SELF);
    let state = state_with(store.clone());

    let filter = state.authz.data_scope.owned_filter_for::<User>(2).await;
    assert!(filter.allows(&user(2, Some(101))));
    assert!(!filter.allows(&user(3, Some(101))));
    assert!(!filter.allows(&user(4, Some(102))));
}

#[tokio::test]
async fn test_superuser_bypasses_everything() {
    let state = state_with(seeded_store());

    let permissions = &state.authz.permissions;
    assert!(permissions.has_permission(1, "anything:at:all").await);
    assert!(permissions.has_role(1, "nonexistent").await);
    assert!(!permissions.has_permission(1, "  ").await);
    assert_eq!(
        permissions.permissions(1).await,
        ["system:role:list", "system:user:edit", "system:user:list"]
            .into_iter()
            .map(String::from)
            .collect()
    );
    assert!(permissions.role_keys(1).await.contains("admin"));

    assert_eq!(
        state.authz.data_scope.resolve_accessible_departments(1).await,
        ids(&[100, 101, 102, 103])
    );
    let routes = state.authz.routes_for(1).await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].children.len(), 2);
}

#[tokio::test]
async fn test_user_without_roles_gets_nothing() {
    let state = state_with(seeded_store());

    assert!(state.authz.data_scope.resolve_accessible_departments(3).await.is_empty());
    assert_eq!(state.authz.data_scope.effective_scope(3).await, None);
    assert!(state.authz.permissions.permissions(3).await.is_empty());
    assert!(!state.authz.permissions.has_permission(3, "system:user:list").await);
    assert!(state.authz.routes_for(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_role_grants_nothing() {
    let store = seeded_store();
    store.grant_role(2, ROLE_ALL);
    store.grant_menus(ROLE_ALL, &[1, 2]);
    let state = state_with(store);

    assert!(state.authz.permissions.has_permission(2, "system:user:list").await);
    state.admin.set_role_status(ROLE_ALL, false).await.unwrap();

    assert!(!state.authz.permissions.has_permission(2, "system:user:list").await);
    assert!(state.authz.data_scope.resolve_accessible_departments(2).await.is_empty());
}

#[tokio::test]
async fn test_strict_linkage_reduces_to_leaves() {
    let store = seeded_store();
    store.grant_menus(ROLE_DEPT, &[1, 2, 3, 4]);
    let state = state_with(store);

    let checked = state.authz.linkage.reduce_for_display(ROLE_DEPT).await.unwrap();
    assert_eq!(checked, ids(&[3, 4]));
    assert!(state.authz.linkage.reduce_for_display(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_menu_grant_edit_is_visible_immediately() {
    let store = seeded_store();
    store.grant_role(2, ROLE_DEPT);
    let state = state_with(store);

    let permissions = &state.authz.permissions;
    assert!(!permissions.has_permission(2, "system:user:list").await);

    state.admin.assign_role_menus(ROLE_DEPT, &[1, 2]).await.unwrap();
    assert!(permissions.has_permission(2, "system:user:list").await);
    assert_eq!(state.authz.routes_for(2).await.unwrap().len(), 1);

    state.admin.assign_role_menus(ROLE_DEPT, &[]).await.unwrap();
    assert!(!permissions.has_permission(2, "system:user:list").await);
}

#[tokio::test]
async fn test_user_role_edit_is_visible_immediately() {
    let store = seeded_store();
    store.grant_role(2, ROLE_DEPT);
    let state = state_with(store);

    let scope = &state.authz.data_scope;
    assert_eq!(scope.resolve_accessible_departments(2).await, ids(&[101]));

    state.admin.assign_user_roles(2, &[ROLE_BELOW]).await.unwrap();
    assert_eq!(scope.resolve_accessible_departments(2).await, ids(&[101, 102]));
}

#[tokio::test]
async fn test_department_move_rewrites_chains_and_scope() {
    let store = seeded_store();
    store.grant_role(2, ROLE_BELOW);
    let state = state_with(store.clone());

    assert_eq!(
        state.authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[101, 102])
    );

    let updates = state.admin.move_department(103, 102).await.unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(store.department(103).unwrap().ancestors, "0,100,101,102");
    assert_eq!(store.department(103).unwrap().parent_id, 102);

    assert_eq!(
        state.authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[101, 102, 103])
    );
}

#[tokio::test]
async fn test_department_move_under_descendant_rejected() {
    let state = state_with(seeded_store());

    let err = state.admin.move_department(101, 102).await.unwrap_err();
    assert!(matches!(err, RepoError::Hierarchy(_)));
}

#[tokio::test]
async fn test_superuser_role_and_user_are_protected() {
    let state = state_with(seeded_store());

    let err = state.admin.assign_role_menus(ROLE_ADMIN, &[1]).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::CannotModifyAdmin, _)));

    let err = state.admin.assign_user_roles(1, &[ROLE_DEPT]).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::CannotModifyAdmin, _)));

    let err = state.admin.assign_user_roles(2, &[ROLE_ADMIN]).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::CannotModifyAdmin, _)));
}

#[tokio::test]
async fn test_store_failure_denies_access() {
    let store = seeded_store();
    store.grant_role(2, ROLE_ALL);
    store.grant_menus(ROLE_ALL, &[1, 2]);
    let state = state_with(store.clone());

    store.set_unavailable(true);
    assert!(state.authz.data_scope.resolve_accessible_departments(2).await.is_empty());
    assert!(!state.authz.permissions.has_permission(2, "system:user:list").await);

    // Failures are not cached
    store.set_unavailable(false);
    assert_eq!(
        state.authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[100, 101, 102, 103])
    );
    assert!(state.authz.permissions.has_permission(2, "system:user:list").await);
}

#[tokio::test]
async fn test_cache_outage_falls_back_to_store() {
    let store = seeded_store();
    store.grant_role(2, ROLE_BELOW);
    store.grant_menus(ROLE_BELOW, &[1, 2]);
    let cache = Arc::new(FailingCache::default());
    let (authz, admin) = engine_with_cache(store, cache.clone());

    assert_eq!(
        authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[101, 102])
    );
    assert!(authz.permissions.has_permission(2, "system:user:list").await);
    assert!(!authz.permissions.has_permission(2, "system:user:edit").await);

    // Writes are acknowledged even though invalidation fails
    admin.assign_role_menus(ROLE_BELOW, &[1, 2, 3]).await.unwrap();
    assert!(authz.permissions.has_permission(2, "system:user:edit").await);

    let updates = admin.move_department(102, 103).await.unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        authz.data_scope.resolve_accessible_departments(2).await,
        ids(&[101])
    );

    admin.assign_user_roles(3, &[ROLE_DEPT]).await.unwrap();
    assert_eq!(
        authz.permissions.role_keys(3).await,
        BTreeSet::from(["dept".to_string()])
    );
    assert!(cache.calls() > 0);
}

#[tokio::test]
async fn test_has_any_permission() {
    let store = seeded_store();
    store.grant_role(2, ROLE_BELOW);
    store.grant_menus(ROLE_BELOW, &[1, 2]);
    let state = state_with(store);
    let permissions = &state.authz.permissions;

    assert!(
        permissions
            .has_any_permission(2, &["system:role:edit", "system:user:list"])
            .await
    );
    assert!(permissions.has_any_permission(2, &["", "system:user:list"]).await);
    assert!(!permissions.has_any_permission(2, &["system:role:edit", " "]).await);
    assert!(!permissions.has_any_permission(2, &[]).await);

    // Superuser: any non-blank entry passes, blanks alone never do
    assert!(permissions.has_any_permission(1, &["", "x:y:z"]).await);
    assert!(!permissions.has_any_permission(1, &["", "  "]).await);
}
