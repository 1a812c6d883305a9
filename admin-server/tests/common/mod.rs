//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use admin_server::cache::{AuthzCache, CacheError, CacheResult, CacheStore, DEFAULT_TTL};
use admin_server::db::MemoryStore;
use admin_server::services::AdminService;
use admin_server::{AuthzEngine, Config, ServerState};
use async_trait::async_trait;
use shared::models::{DataScope, Department, Menu, MenuKind, Role, User};

pub fn dept(id: i64, parent_id: i64, ancestors: &str) -> Department {
    Department {
        id,
        parent_id,
        ancestors: ancestors.to_string(),
        dept_name: format!("dept-{id}"),
        order_num: 0,
        is_active: true,
    }
}

pub fn user(id: i64, dept_id: Option<i64>) -> User {
    User {
        id,
        dept_id,
        user_name: format!("user{id}"),
        nick_name: format!("User {id}"),
        is_active: true,
    }
}

pub fn role(id: i64, role_key: &str, data_scope: DataScope) -> Role {
    Role {
        id,
        role_name: role_key.to_string(),
        role_key: role_key.to_string(),
        role_sort: id as i32,
        data_scope,
        menu_check_strictly: true,
        dept_check_strictly: true,
        is_active: true,
    }
}

pub fn menu(id: i64, parent_id: i64, kind: MenuKind, path: &str, perms: Option<&str>) -> Menu {
    Menu {
        id,
        parent_id,
        menu_name: format!("menu-{id}"),
        order_num: id as i32,
        path: path.to_string(),
        component: match kind {
            MenuKind::Menu => Some(format!("system/{path}/index")),
            _ => None,
        },
        query: None,
        is_frame: false,
        is_cache: true,
        menu_type: kind,
        visible: true,
        is_active: true,
        perms: perms.map(str::to_string),
        icon: "#".to_string(),
    }
}

/// Role ids of the fixture
pub const ROLE_ADMIN: i64 = 1;
pub const ROLE_DEPT: i64 = 2;
pub const ROLE_ALL: i64 = 3;
pub const ROLE_BELOW: i64 = 4;
pub const ROLE_CUSTOM: i64 = 5;
pub const ROLE_SELF: i64 = 6;

/// Fixture tree
///
/// ```text
/// 100 Head Office
/// ├── 101 Sales
/// │   └── 102 Sales East
/// └── 103 Support
/// ```
///
/// Users: 1 superuser (100), 2 and 3 in 101, 4 in 102.
/// Menus: 1 `system` directory, 2 `user` page, 3 user-edit button, 4 `role` page.
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store.insert_department(dept(100, 0, "0"));
    store.insert_department(dept(101, 100, "0,100"));
    store.insert_department(dept(102, 101, "0,100,101"));
    store.insert_department(dept(103, 100, "0,100"));

    store.insert_user(user(1, Some(100)));
    store.insert_user(user(2, Some(101)));
    store.insert_user(user(3, Some(101)));
    store.insert_user(user(4, Some(102)));

    store.insert_role(role(ROLE_ADMIN, "admin", DataScope::All));
    store.insert_role(role(ROLE_DEPT, "dept", DataScope::Department));
    store.insert_role(role(ROLE_ALL, "all", DataScope::All));
    store.insert_role(role(ROLE_BELOW, "below", DataScope::DepartmentAndBelow));
    store.insert_role(role(ROLE_CUSTOM, "custom", DataScope::Custom));
    store.insert_role(role(ROLE_SELF, "self", DataScope::SelfOnly));
    store.grant_role(1, ROLE_ADMIN);
    store.grant_departments(ROLE_CUSTOM, &[103]);

    store.insert_menu(menu(1, 0, MenuKind::Directory, "system", None));
    store.insert_menu(menu(2, 1, MenuKind::Menu, "user", Some("system:user:list")));
    store.insert_menu(menu(3, 2, MenuKind::Button, "", Some("system:user:edit")));
    store.insert_menu(menu(4, 1, MenuKind::Menu, "role", Some("system:role:list")));

    store
}

pub fn state_with(store: Arc<MemoryStore>) -> ServerState {
    ServerState::with_store(Config::with_overrides("sqlite::memory:", 0), store)
}

/// Cache backend that is down: every call fails
#[derive(Default)]
pub struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        self.fail()
    }

    async fn remove(&self, _key: &str) -> CacheResult<()> {
        self.fail()
    }

    async fn remove_by_prefix(&self, _prefix: &str) -> CacheResult<usize> {
        self.fail()
    }
}

/// Engine and admin service over `store`, with `cache` as the backend
pub fn engine_with_cache(
    store: Arc<MemoryStore>,
    cache: Arc<dyn CacheStore>,
) -> (AuthzEngine, AdminService) {
    let authz = AuthzEngine::new(store.clone(), AuthzCache::new(cache, DEFAULT_TTL));
    let admin = AdminService::new(store, authz.invalidator.clone());
    (authz, admin)
}
