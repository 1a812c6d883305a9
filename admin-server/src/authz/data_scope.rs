//! Data Scope Resolver
//!
//! Computes the set of department ids a user may access from the user's
//! enabled roles. Results are cached per user; store failures are logged
//! and resolve to the empty set without being cached.

use std::collections::BTreeSet;
use std::sync::Arc;

use shared::error::{AppError, AppResult};
use shared::models::{DataScope, Department, Role, is_super_admin};

use super::hierarchy::is_descendant;
use super::row_filter::{DepartmentScoped, Owned, RowFilter, build_filter};
use crate::cache::{AuthzCache, CacheKey};
use crate::db::{AuthzStore, RepoResult};
use crate::security_log;

/// Outcome of one uncached resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Resolution {
    scope: Option<DataScope>,
    departments: BTreeSet<i64>,
}

/// Departments reachable under `scope`
///
/// Disabled departments are never part of the result.
pub fn resolve_scope(
    scope: DataScope,
    home_dept: Option<i64>,
    departments: &[Department],
    custom_grants: &[i64],
) -> BTreeSet<i64> {
    let enabled = departments.iter().filter(|d| d.is_active);
    match scope {
        DataScope::All => enabled.map(|d| d.id).collect(),
        DataScope::Custom => enabled
            .filter(|d| custom_grants.contains(&d.id))
            .map(|d| d.id)
            .collect(),
        DataScope::Department | DataScope::SelfOnly => {
            let Some(home) = home_dept else {
                return BTreeSet::new();
            };
            enabled.filter(|d| d.id == home).map(|d| d.id).collect()
        }
        DataScope::DepartmentAndBelow => {
            let Some(home) = home_dept else {
                return BTreeSet::new();
            };
            enabled
                .filter(|d| d.id == home || is_descendant(&d.ancestors, home))
                .map(|d| d.id)
                .collect()
        }
    }
}

#[derive(Clone)]
pub struct DataScopeResolver {
    store: Arc<dyn AuthzStore>,
    cache: AuthzCache,
}

impl DataScopeResolver {
    pub fn new(store: Arc<dyn AuthzStore>, cache: AuthzCache) -> Self {
        Self { store, cache }
    }

    /// Department ids the user may access
    ///
    /// Unknown users and users without enabled roles get the empty set.
    pub async fn resolve_accessible_departments(&self, user_id: i64) -> BTreeSet<i64> {
        let key = CacheKey::accessible_depts(user_id);
        if let Some(cached) = self.cache.get::<BTreeSet<i64>>(&key).await {
            return cached;
        }
        self.resolve_and_cache(user_id).await.departments
    }

    /// Most permissive scope across the user's enabled roles
    pub async fn effective_scope(&self, user_id: i64) -> Option<DataScope> {
        let key = CacheKey::data_scope(user_id);
        if let Some(cached) = self.cache.get::<Option<DataScope>>(&key).await {
            return cached;
        }
        self.resolve_and_cache(user_id).await.scope
    }

    /// Fails unless `dept_id` is inside the user's data scope
    pub async fn ensure_department_accessible(&self, user_id: i64, dept_id: i64) -> AppResult<()> {
        if is_super_admin(user_id) {
            return Ok(());
        }
        if self
            .resolve_accessible_departments(user_id)
            .await
            .contains(&dept_id)
        {
            return Ok(());
        }
        security_log!(
            "WARN",
            "data_scope_denied",
            user_id = user_id,
            dept_id = dept_id
        );
        Err(AppError::data_scope_denied(format!("department {dept_id}")))
    }

    /// Department filter for rows of `E` visible to the user
    pub async fn filter_for<E: DepartmentScoped>(&self, user_id: i64) -> RowFilter<E> {
        if is_super_admin(user_id) {
            return RowFilter::unrestricted();
        }
        build_filter(&self.resolve_accessible_departments(user_id).await)
    }

    /// Like [`Self::filter_for`], adding the owner check under the Self scope
    pub async fn owned_filter_for<E: DepartmentScoped + Owned>(&self, user_id: i64) -> RowFilter<E> {
        let filter = self.filter_for::<E>(user_id).await;
        if is_super_admin(user_id) {
            return filter;
        }
        match self.effective_scope(user_id).await {
            Some(DataScope::SelfOnly) => filter.owned_by(user_id),
            _ => filter,
        }
    }

    async fn resolve_and_cache(&self, user_id: i64) -> Resolution {
        match self.resolve(user_id).await {
            Ok(resolution) => {
                tracing::debug!(
                    user_id,
                    scope = ?resolution.scope,
                    departments = resolution.departments.len(),
                    "Resolved data scope"
                );
                self.cache
                    .put(&CacheKey::accessible_depts(user_id), &resolution.departments)
                    .await;
                self.cache
                    .put(&CacheKey::data_scope(user_id), &resolution.scope)
                    .await;
                resolution
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Data scope resolution failed, denying access");
                Resolution::default()
            }
        }
    }

    async fn resolve(&self, user_id: i64) -> RepoResult<Resolution> {
        if is_super_admin(user_id) {
            let departments = self.store.list_departments().await?;
            return Ok(Resolution {
                scope: Some(DataScope::All),
                departments: resolve_scope(DataScope::All, None, &departments, &[]),
            });
        }

        let Some(user) = self.store.find_user(user_id).await? else {
            return Ok(Resolution::default());
        };
        if !user.is_active {
            return Ok(Resolution::default());
        }

        let roles: Vec<Role> = self
            .store
            .roles_of_user(user_id)
            .await?
            .into_iter()
            .filter(|r| r.is_active)
            .collect();
        let Some(scope) = DataScope::most_permissive(roles.iter().map(|r| r.data_scope)) else {
            return Ok(Resolution::default());
        };

        let custom_grants = if scope == DataScope::Custom {
            let custom_roles: Vec<i64> = roles
                .iter()
                .filter(|r| r.data_scope == DataScope::Custom)
                .map(|r| r.id)
                .collect();
            self.store.role_dept_ids(&custom_roles).await?
        } else {
            Vec::new()
        };

        let departments = self.store.list_departments().await?;
        Ok(Resolution {
            scope: Some(scope),
            departments: resolve_scope(scope, user.dept_id, &departments, &custom_grants),
        })
    }
}
