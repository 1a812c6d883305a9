//! SQLite store against a throwaway database file

use std::collections::BTreeSet;
use std::sync::Arc;

use admin_server::authz::RowFilter;
use admin_server::authz::hierarchy::{HierarchyError, find_inconsistent};
use admin_server::authz::row_filter::build_filter;
use admin_server::db::{AdminStore, AuthzStore, RepoError, SqliteStore};
use shared::models::{DataScope, MenuKind, User};
use tempfile::TempDir;

async fn open() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("admin.db").display());
    let store = SqliteStore::connect(&url).await.unwrap();
    (dir, store)
}

/// Seeds 101 under the seeded head office (100), 102 under 101, and user 2 in 101
async fn seed(store: &SqliteStore) {
    let statements = [
        "INSERT INTO sys_dept (id, parent_id, ancestors, dept_name, order_num) VALUES (101, 100, '0,100', 'Sales', 1)",
        "INSERT INTO sys_dept (id, parent_id, ancestors, dept_name, order_num) VALUES (102, 101, '0,100,101', 'Sales East', 1)",
        "INSERT INTO sys_user (id, dept_id, user_name, nick_name) VALUES (2, 101, 'sales', 'Sales Lead')",
        "INSERT INTO sys_role (id, role_name, role_key, role_sort, data_scope) VALUES (2, 'Sales', 'sales', 2, 'department_and_below')",
        "INSERT INTO sys_role (id, role_name, role_key, role_sort, data_scope) VALUES (3, 'Auditor', 'auditor', 3, 'custom')",
        "INSERT INTO sys_menu (id, parent_id, menu_name, order_num, path, menu_type) VALUES (1, 0, 'System', 1, 'system', 'directory')",
        "INSERT INTO sys_menu (id, parent_id, menu_name, order_num, path, component, menu_type, perms) VALUES (2, 1, 'Users', 1, 'user', 'system/user/index', 'menu', 'system:user:list')",
        "INSERT INTO sys_menu (id, parent_id, menu_name, order_num, menu_type, perms) VALUES (3, 2, 'Edit user', 1, 'button', 'system:user:edit')",
    ];
    for sql in statements {
        sqlx::query(sql).execute(store.pool()).await.unwrap();
    }
}

#[tokio::test]
async fn test_migrations_seed_superuser() {
    let (_dir, store) = open().await;

    let admin = store.find_user(1).await.unwrap().unwrap();
    assert_eq!(admin.dept_id, Some(100));
    assert!(admin.is_active);

    let roles = store.roles_of_user(1).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role_key, "admin");
    assert_eq!(roles[0].data_scope, DataScope::All);
}

#[tokio::test]
async fn test_reads_decode_enums() {
    let (_dir, store) = open().await;
    seed(&store).await;

    let role = store.find_role(2).await.unwrap().unwrap();
    assert_eq!(role.data_scope, DataScope::DepartmentAndBelow);
    assert!(role.menu_check_strictly);

    let menus = store.list_menus().await.unwrap();
    let kinds: Vec<MenuKind> = menus.iter().map(|m| m.menu_type).collect();
    assert_eq!(kinds, vec![MenuKind::Directory, MenuKind::Menu, MenuKind::Button]);
    assert_eq!(menus[1].permission(), Some("system:user:list"));

    let depts = store.list_departments().await.unwrap();
    let ids: Vec<i64> = depts.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);
}

#[tokio::test]
async fn test_replace_grants() {
    let (_dir, store) = open().await;
    seed(&store).await;

    store.replace_role_menus(2, &[1, 2]).await.unwrap();
    store.replace_role_menus(2, &[2, 3]).await.unwrap();
    assert_eq!(store.role_menu_ids(&[2]).await.unwrap(), vec![2, 3]);

    store.replace_role_depts(3, &[101, 102]).await.unwrap();
    assert_eq!(store.role_dept_ids(&[2, 3]).await.unwrap(), vec![101, 102]);
    assert!(store.role_dept_ids(&[]).await.unwrap().is_empty());

    store.replace_user_roles(2, &[2, 3]).await.unwrap();
    let keys: Vec<String> = store
        .roles_of_user(2)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.role_key)
        .collect();
    assert_eq!(keys, vec!["sales", "auditor"]);
    assert_eq!(store.user_ids_with_role(3).await.unwrap(), vec![2]);

    store.replace_user_roles(2, &[]).await.unwrap();
    assert!(store.roles_of_user(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_role_active() {
    let (_dir, store) = open().await;
    seed(&store).await;

    store.set_role_active(2, false).await.unwrap();
    assert!(!store.find_role(2).await.unwrap().unwrap().is_active);

    let err = store.set_role_active(99, false).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_reparent_department() {
    let (_dir, store) = open().await;
    seed(&store).await;

    // Move Sales (with Sales East) to the top level
    let updates = store.reparent_department(101, 0).await.unwrap();
    assert_eq!(updates.len(), 2);

    let depts = store.list_departments().await.unwrap();
    let sales = depts.iter().find(|d| d.id == 101).unwrap();
    let east = depts.iter().find(|d| d.id == 102).unwrap();
    assert_eq!((sales.parent_id, sales.ancestors.as_str()), (0, "0"));
    assert_eq!((east.parent_id, east.ancestors.as_str()), (101, "0,101"));
}

#[tokio::test]
async fn test_reparent_rejection_leaves_tree_untouched() {
    let (_dir, store) = open().await;
    seed(&store).await;
    let before = store.list_departments().await.unwrap();

    let err = store.reparent_department(101, 102).await.unwrap_err();
    assert!(matches!(
        err,
        RepoError::Hierarchy(HierarchyError::InvalidParent { id: 101, parent_id: 102 })
    ));
    let err = store.reparent_department(999, 0).await.unwrap_err();
    assert!(matches!(err, RepoError::Hierarchy(HierarchyError::NodeNotFound(999))));

    assert_eq!(store.list_departments().await.unwrap(), before);
}

/// Two moves that would form a cycle if both were planned against the same tree
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_chains_consistent() {
    for _ in 0..10 {
        let (_dir, store) = open().await;
        seed(&store).await;
        sqlx::query(
            "INSERT INTO sys_dept (id, parent_id, ancestors, dept_name, order_num) VALUES (103, 100, '0,100', 'Support', 2)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let store = Arc::new(store);
        let first = tokio::spawn({
            let store = store.clone();
            async move { store.reparent_department(101, 103).await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.reparent_department(103, 102).await }
        });
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        // Whichever commits first wins; the other now sees a cycle
        assert!(first.is_ok() != second.is_ok(), "{first:?} / {second:?}");
        let rejected = first.err().or(second.err()).unwrap();
        assert!(matches!(
            rejected,
            RepoError::Hierarchy(HierarchyError::InvalidParent { .. })
        ));

        let depts = store.list_departments().await.unwrap();
        assert!(find_inconsistent(&depts).is_empty(), "{depts:?}");
    }
}

#[tokio::test]
async fn test_find_users_narrows_in_query() {
    let (_dir, store) = open().await;
    seed(&store).await;
    sqlx::query("INSERT INTO sys_user (id, dept_id, user_name) VALUES (3, NULL, 'floating')")
        .execute(store.pool())
        .await
        .unwrap();

    let ids = |users: Vec<User>| users.into_iter().map(|u| u.id).collect::<Vec<_>>();

    let all = store.find_users(&RowFilter::unrestricted()).await.unwrap();
    assert_eq!(ids(all), vec![1, 2, 3]);

    let sales: BTreeSet<i64> = [101, 102].into();
    let scoped = store.find_users(&build_filter(&sales)).await.unwrap();
    assert_eq!(ids(scoped), vec![2]);

    let own = build_filter::<User>(&[100, 101].into()).owned_by(1);
    assert_eq!(ids(store.find_users(&own).await.unwrap()), vec![1]);

    let none = store.find_users(&build_filter(&BTreeSet::new())).await.unwrap();
    assert!(none.is_empty());
}
