//! Admin Service - role grants, user roles and department moves
//!
//! Every write invalidates the affected cache entries before returning, so
//! an acknowledged edit is never followed by a stale authorization read.

use std::collections::BTreeSet;
use std::sync::Arc;

use shared::error::ErrorCode;
use shared::models::{Role, SUPER_ADMIN_ROLE_ID, is_super_admin};

use crate::authz::CacheInvalidator;
use crate::authz::hierarchy::AncestorsUpdate;
use crate::db::{AdminStore, RepoError, RepoResult};
use crate::security_log;

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn AdminStore>,
    invalidator: CacheInvalidator,
}

impl AdminService {
    pub fn new(store: Arc<dyn AdminStore>, invalidator: CacheInvalidator) -> Self {
        Self { store, invalidator }
    }

    /// Moves `dept_id` under `new_parent_id`, rewriting every descendant chain
    pub async fn move_department(
        &self,
        dept_id: i64,
        new_parent_id: i64,
    ) -> RepoResult<Vec<AncestorsUpdate>> {
        let updates = self.store.reparent_department(dept_id, new_parent_id).await?;
        self.invalidator.departments_changed().await;

        tracing::info!(
            dept_id,
            new_parent_id,
            rewritten = updates.len(),
            "Department moved"
        );
        Ok(updates)
    }

    /// Replaces the menu grants of a role
    pub async fn assign_role_menus(&self, role_id: i64, menu_ids: &[i64]) -> RepoResult<()> {
        self.editable_role(role_id).await?;
        let menu_ids = dedup(menu_ids);
        self.store.replace_role_menus(role_id, &menu_ids).await?;
        self.invalidator.role_changed(role_id).await;

        tracing::info!(role_id, menus = menu_ids.len(), "Role menus replaced");
        Ok(())
    }

    /// Replaces the department grants of a role (Custom scope)
    pub async fn assign_role_departments(&self, role_id: i64, dept_ids: &[i64]) -> RepoResult<()> {
        self.editable_role(role_id).await?;
        let dept_ids = dedup(dept_ids);
        self.store.replace_role_depts(role_id, &dept_ids).await?;
        self.invalidator.role_changed(role_id).await;

        tracing::info!(role_id, departments = dept_ids.len(), "Role departments replaced");
        Ok(())
    }

    /// Replaces the roles held by a user
    pub async fn assign_user_roles(&self, user_id: i64, role_ids: &[i64]) -> RepoResult<()> {
        if is_super_admin(user_id) {
            security_log!("WARN", "admin_edit_rejected", user_id = user_id);
            return Err(RepoError::Business(
                ErrorCode::CannotModifyAdmin,
                "Cannot modify the superuser".into(),
            ));
        }
        if self.store.find_user(user_id).await?.is_none() {
            return Err(RepoError::Business(
                ErrorCode::UserNotFound,
                format!("User {user_id} not found"),
            ));
        }
        let role_ids = dedup(role_ids);
        for &role_id in &role_ids {
            if role_id == SUPER_ADMIN_ROLE_ID {
                return Err(RepoError::Business(
                    ErrorCode::CannotModifyAdmin,
                    "The superuser role cannot be assigned".into(),
                ));
            }
            if self.store.find_role(role_id).await?.is_none() {
                return Err(RepoError::Business(
                    ErrorCode::RoleNotFound,
                    format!("Role {role_id} not found"),
                ));
            }
        }

        self.store.replace_user_roles(user_id, &role_ids).await?;
        self.invalidator.user_changed(user_id).await;

        tracing::info!(user_id, roles = role_ids.len(), "User roles replaced");
        Ok(())
    }

    /// Enables or disables a role
    pub async fn set_role_status(&self, role_id: i64, is_active: bool) -> RepoResult<()> {
        self.editable_role(role_id).await?;
        self.store.set_role_active(role_id, is_active).await?;
        self.invalidator.role_changed(role_id).await;

        tracing::info!(role_id, is_active, "Role status changed");
        Ok(())
    }

    /// Loads a role that may be edited; the superuser role never may
    async fn editable_role(&self, role_id: i64) -> RepoResult<Role> {
        if role_id == SUPER_ADMIN_ROLE_ID {
            security_log!("WARN", "admin_edit_rejected", role_id = role_id);
            return Err(RepoError::Business(
                ErrorCode::CannotModifyAdmin,
                "Cannot modify the superuser role".into(),
            ));
        }
        self.store.find_role(role_id).await?.ok_or_else(|| {
            RepoError::Business(ErrorCode::RoleNotFound, format!("Role {role_id} not found"))
        })
    }
}

fn dedup(ids: &[i64]) -> Vec<i64> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}
