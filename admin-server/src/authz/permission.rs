//! Permission Resolver
//!
//! Permission strings and role keys visible to a user, aggregated over the
//! user's enabled roles. The superuser holds every permission and every
//! role key.

use std::collections::BTreeSet;
use std::sync::Arc;

use shared::models::{Menu, Role, is_super_admin};

use crate::cache::{AuthzCache, CacheKey};
use crate::db::{AuthzStore, RepoResult};

/// Wildcard permission granting everything
pub const ALL_PERMISSION: &str = "*:*:*";

/// Role key reported for the superuser
pub const SUPER_ADMIN_ROLE_KEY: &str = "admin";

/// True iff `granted` covers `permission`
pub fn grants_permission(granted: &BTreeSet<String>, permission: &str) -> bool {
    let permission = permission.trim();
    !permission.is_empty() && (granted.contains(ALL_PERMISSION) || granted.contains(permission))
}

/// True iff `granted` covers at least one of `permissions`; blank entries are skipped
pub fn grants_any_permission(granted: &BTreeSet<String>, permissions: &[&str]) -> bool {
    permissions.iter().any(|p| grants_permission(granted, p))
}

#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn AuthzStore>,
    cache: AuthzCache,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn AuthzStore>, cache: AuthzCache) -> Self {
        Self { store, cache }
    }

    /// Permission strings of the user
    pub async fn permissions(&self, user_id: i64) -> BTreeSet<String> {
        let key = CacheKey::permissions(user_id);
        if let Some(cached) = self.cache.get::<BTreeSet<String>>(&key).await {
            return cached;
        }
        match self.load_permissions(user_id).await {
            Ok(permissions) => {
                self.cache.put(&key, &permissions).await;
                permissions
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Permission resolution failed, denying access");
                BTreeSet::new()
            }
        }
    }

    /// Role keys of the user's enabled roles
    pub async fn role_keys(&self, user_id: i64) -> BTreeSet<String> {
        let key = CacheKey::roles(user_id);
        if let Some(cached) = self.cache.get::<BTreeSet<String>>(&key).await {
            return cached;
        }
        match self.load_role_keys(user_id).await {
            Ok(keys) => {
                self.cache.put(&key, &keys).await;
                keys
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Role resolution failed, denying access");
                BTreeSet::new()
            }
        }
    }

    pub async fn has_permission(&self, user_id: i64, permission: &str) -> bool {
        if permission.trim().is_empty() {
            return false;
        }
        if is_super_admin(user_id) {
            return true;
        }
        grants_permission(&self.permissions(user_id).await, permission)
    }

    /// True if the user holds at least one of `permissions`
    pub async fn has_any_permission(&self, user_id: i64, permissions: &[&str]) -> bool {
        if permissions.iter().all(|p| p.trim().is_empty()) {
            return false;
        }
        if is_super_admin(user_id) {
            return true;
        }
        grants_any_permission(&self.permissions(user_id).await, permissions)
    }

    pub async fn has_role(&self, user_id: i64, role_key: &str) -> bool {
        let role_key = role_key.trim();
        if role_key.is_empty() {
            return false;
        }
        if is_super_admin(user_id) {
            return true;
        }
        self.role_keys(user_id).await.contains(role_key)
    }

    /// Enabled menus of every kind granted to the user, in display order
    pub async fn granted_menus(&self, user_id: i64) -> RepoResult<Vec<Menu>> {
        let menus = self.store.list_menus().await?;
        if is_super_admin(user_id) {
            return Ok(menus.into_iter().filter(|m| m.is_active).collect());
        }
        let granted = self.granted_menu_ids(user_id).await?;
        Ok(menus
            .into_iter()
            .filter(|m| m.is_active && granted.contains(&m.id))
            .collect())
    }

    /// Granted directories and pages, the input of route building
    pub async fn accessible_menus(&self, user_id: i64) -> RepoResult<Vec<Menu>> {
        let mut menus = self.granted_menus(user_id).await?;
        menus.retain(|m| m.menu_type.is_routable());
        Ok(menus)
    }

    async fn enabled_roles(&self, user_id: i64) -> RepoResult<Vec<Role>> {
        match self.store.find_user(user_id).await? {
            Some(user) if user.is_active => Ok(self
                .store
                .roles_of_user(user_id)
                .await?
                .into_iter()
                .filter(|r| r.is_active)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn granted_menu_ids(&self, user_id: i64) -> RepoResult<BTreeSet<i64>> {
        let role_ids: Vec<i64> = self
            .enabled_roles(user_id)
            .await?
            .iter()
            .map(|r| r.id)
            .collect();
        Ok(self
            .store
            .role_menu_ids(&role_ids)
            .await?
            .into_iter()
            .collect())
    }

    async fn load_permissions(&self, user_id: i64) -> RepoResult<BTreeSet<String>> {
        let menus = self.store.list_menus().await?;
        let enabled = menus.iter().filter(|m| m.is_active);

        if is_super_admin(user_id) {
            return Ok(enabled
                .filter_map(Menu::permission)
                .map(str::to_string)
                .collect());
        }
        let granted = self.granted_menu_ids(user_id).await?;
        Ok(enabled
            .filter(|m| granted.contains(&m.id))
            .filter_map(Menu::permission)
            .map(str::to_string)
            .collect())
    }

    async fn load_role_keys(&self, user_id: i64) -> RepoResult<BTreeSet<String>> {
        let mut keys: BTreeSet<String> = self
            .enabled_roles(user_id)
            .await?
            .into_iter()
            .map(|r| r.role_key)
            .collect();
        if is_super_admin(user_id) {
            keys.insert(SUPER_ADMIN_ROLE_KEY.to_string());
        }
        Ok(keys)
    }
}
