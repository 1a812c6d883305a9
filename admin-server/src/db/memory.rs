//! In-memory store
//!
//! Same contract as [`super::SqliteStore`], held behind a `RwLock`. Used by
//! tests and by embedders that load the tables from elsewhere.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{Department, Menu, Role, User};

use super::{AdminStore, AuthzStore, RepoError, RepoResult};
use crate::authz::RowFilter;
use crate::authz::hierarchy::{AncestorsUpdate, plan_reparent};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    roles: BTreeMap<i64, Role>,
    departments: BTreeMap<i64, Department>,
    menus: BTreeMap<i64, Menu>,
    /// (user_id, role_id)
    user_roles: BTreeSet<(i64, i64)>,
    /// (role_id, menu_id)
    role_menus: BTreeSet<(i64, i64)>,
    /// (role_id, dept_id)
    role_depts: BTreeSet<(i64, i64)>,
}

/// In-memory implementation of [`AuthzStore`] and [`AdminStore`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault-injection switch: while set, every store call fails with a
    /// database error. Lets embedders and tests exercise the fail-closed
    /// paths of the resolvers.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> RepoResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::Database("store unavailable".into()));
        }
        Ok(())
    }

    pub fn insert_user(&self, user: User) {
        self.tables.write().users.insert(user.id, user);
    }

    pub fn insert_role(&self, role: Role) {
        self.tables.write().roles.insert(role.id, role);
    }

    pub fn insert_department(&self, dept: Department) {
        self.tables.write().departments.insert(dept.id, dept);
    }

    pub fn insert_menu(&self, menu: Menu) {
        self.tables.write().menus.insert(menu.id, menu);
    }

    pub fn grant_role(&self, user_id: i64, role_id: i64) {
        self.tables.write().user_roles.insert((user_id, role_id));
    }

    pub fn grant_menus(&self, role_id: i64, menu_ids: &[i64]) {
        let mut tables = self.tables.write();
        tables
            .role_menus
            .extend(menu_ids.iter().map(|&menu_id| (role_id, menu_id)));
    }

    pub fn grant_departments(&self, role_id: i64, dept_ids: &[i64]) {
        let mut tables = self.tables.write();
        tables
            .role_depts
            .extend(dept_ids.iter().map(|&dept_id| (role_id, dept_id)));
    }

    /// Disables (or re-enables) a department in place
    pub fn set_department_active(&self, dept_id: i64, is_active: bool) {
        if let Some(dept) = self.tables.write().departments.get_mut(&dept_id) {
            dept.is_active = is_active;
        }
    }

    pub fn department(&self, dept_id: i64) -> Option<Department> {
        self.tables.read().departments.get(&dept_id).cloned()
    }
}

fn grants(edges: &BTreeSet<(i64, i64)>, role_ids: &[i64]) -> Vec<i64> {
    edges
        .iter()
        .filter(|(role_id, _)| role_ids.contains(role_id))
        .map(|&(_, target)| target)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[async_trait]
impl AuthzStore for MemoryStore {
    async fn find_user(&self, user_id: i64) -> RepoResult<Option<User>> {
        self.check()?;
        Ok(self.tables.read().users.get(&user_id).cloned())
    }

    async fn find_users(&self, filter: &RowFilter<User>) -> RepoResult<Vec<User>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .users
            .values()
            .filter(|u| filter.allows(u))
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: i64) -> RepoResult<Option<Role>> {
        self.check()?;
        Ok(self.tables.read().roles.get(&role_id).cloned())
    }

    async fn roles_of_user(&self, user_id: i64) -> RepoResult<Vec<Role>> {
        self.check()?;
        let tables = self.tables.read();
        let mut roles: Vec<Role> = tables
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, role_id)| tables.roles.get(role_id).cloned())
            .collect();
        roles.sort_by_key(|r| (r.role_sort, r.id));
        Ok(roles)
    }

    async fn user_ids_with_role(&self, role_id: i64) -> RepoResult<Vec<i64>> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .user_roles
            .iter()
            .filter(|(_, rid)| *rid == role_id)
            .map(|&(user_id, _)| user_id)
            .collect())
    }

    async fn list_departments(&self) -> RepoResult<Vec<Department>> {
        self.check()?;
        let mut depts: Vec<Department> = self.tables.read().departments.values().cloned().collect();
        depts.sort_by_key(|d| (d.parent_id, d.order_num, d.id));
        Ok(depts)
    }

    async fn role_dept_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>> {
        self.check()?;
        Ok(grants(&self.tables.read().role_depts, role_ids))
    }

    async fn list_menus(&self) -> RepoResult<Vec<Menu>> {
        self.check()?;
        let mut menus: Vec<Menu> = self.tables.read().menus.values().cloned().collect();
        menus.sort_by_key(|m| (m.parent_id, m.order_num, m.id));
        Ok(menus)
    }

    async fn role_menu_ids(&self, role_ids: &[i64]) -> RepoResult<Vec<i64>> {
        self.check()?;
        Ok(grants(&self.tables.read().role_menus, role_ids))
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn replace_role_menus(&self, role_id: i64, menu_ids: &[i64]) -> RepoResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.role_menus.retain(|(rid, _)| *rid != role_id);
        tables
            .role_menus
            .extend(menu_ids.iter().map(|&menu_id| (role_id, menu_id)));
        Ok(())
    }

    async fn replace_role_depts(&self, role_id: i64, dept_ids: &[i64]) -> RepoResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.role_depts.retain(|(rid, _)| *rid != role_id);
        tables
            .role_depts
            .extend(dept_ids.iter().map(|&dept_id| (role_id, dept_id)));
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: i64, role_ids: &[i64]) -> RepoResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.user_roles.retain(|(uid, _)| *uid != user_id);
        tables
            .user_roles
            .extend(role_ids.iter().map(|&role_id| (user_id, role_id)));
        Ok(())
    }

    async fn set_role_active(&self, role_id: i64, is_active: bool) -> RepoResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        let role = tables
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| RepoError::NotFound(format!("Role {role_id} not found")))?;
        role.is_active = is_active;
        Ok(())
    }

    async fn reparent_department(
        &self,
        dept_id: i64,
        new_parent_id: i64,
    ) -> RepoResult<Vec<AncestorsUpdate>> {
        self.check()?;
        let mut tables = self.tables.write();
        let departments: Vec<Department> = tables.departments.values().cloned().collect();
        let updates = plan_reparent(&departments, dept_id, new_parent_id)?;
        for update in &updates {
            if let Some(dept) = tables.departments.get_mut(&update.id) {
                if let Some(parent_id) = update.parent_id {
                    dept.parent_id = parent_id;
                }
                dept.ancestors = update.ancestors.clone();
            }
        }
        Ok(updates)
    }
}
