//! Cache invalidation hooks
//!
//! Called by write paths before the edit is acknowledged. Failures are
//! logged and swallowed; the TTL bounds how long a missed invalidation can
//! serve stale data.

use std::sync::Arc;

use crate::cache::{AuthzCache, KeyFamily};
use crate::db::AuthzStore;

#[derive(Clone)]
pub struct CacheInvalidator {
    store: Arc<dyn AuthzStore>,
    cache: AuthzCache,
}

impl CacheInvalidator {
    pub fn new(store: Arc<dyn AuthzStore>, cache: AuthzCache) -> Self {
        Self { store, cache }
    }

    /// A user's role assignments or home department changed
    pub async fn user_changed(&self, user_id: i64) {
        if let Err(e) = self.cache.invalidate_user(user_id).await {
            tracing::warn!(user_id, error = %e, "Failed to invalidate user cache");
        }
    }

    /// A role's grants, scope or status changed
    ///
    /// Clears every holder of the role. If the holders cannot be listed,
    /// every per-user entry is cleared instead.
    pub async fn role_changed(&self, role_id: i64) {
        match self.store.user_ids_with_role(role_id).await {
            Ok(user_ids) => {
                tracing::debug!(role_id, users = user_ids.len(), "Invalidating role holders");
                for user_id in user_ids {
                    self.user_changed(user_id).await;
                }
            }
            Err(e) => {
                tracing::warn!(role_id, error = %e, "Cannot list role holders, clearing all users");
                for family in KeyFamily::ALL {
                    self.clear_family(family).await;
                }
            }
        }
    }

    /// The department tree changed (move, enable, disable)
    pub async fn departments_changed(&self) {
        self.clear_family(KeyFamily::DataScope).await;
        self.clear_family(KeyFamily::AccessibleDepts).await;
    }

    /// Menus changed (permission strings, status)
    pub async fn menus_changed(&self) {
        self.clear_family(KeyFamily::Permissions).await;
    }

    async fn clear_family(&self, family: KeyFamily) {
        match self.cache.invalidate_family(family).await {
            Ok(removed) => tracing::debug!(prefix = family.prefix(), removed, "Cleared cache family"),
            Err(e) => {
                tracing::warn!(prefix = family.prefix(), error = %e, "Failed to clear cache family")
            }
        }
    }
}
