//! Authorization engine
//!
//! Decides what a user may see and do:
//!
//! - [`hierarchy`]: ancestors-chain codec and hierarchy edit planning
//! - [`data_scope`]: accessible department set per user
//! - [`row_filter`]: department-scoped row predicates
//! - [`permission`]: permission strings and role keys per user
//! - [`linkage`]: leaf reduction for tree-checkbox screens
//! - [`routes`]: menu list → UI route tree
//! - [`tree`]: checkbox-tree projections
//! - [`invalidation`]: cache invalidation hooks for write paths

pub mod data_scope;
pub mod hierarchy;
pub mod invalidation;
pub mod linkage;
pub mod permission;
pub mod routes;
pub mod row_filter;
pub mod tree;

pub use data_scope::DataScopeResolver;
pub use invalidation::CacheInvalidator;
pub use linkage::LinkageReducer;
pub use permission::PermissionResolver;
pub use row_filter::{DepartmentScoped, Owned, RowFilter};

use std::sync::Arc;

use shared::models::RouteNode;

use crate::cache::AuthzCache;
use crate::db::{AuthzStore, RepoResult};

/// All engine components over one store and one cache
#[derive(Clone)]
pub struct AuthzEngine {
    pub data_scope: DataScopeResolver,
    pub permissions: PermissionResolver,
    pub linkage: LinkageReducer,
    pub invalidator: CacheInvalidator,
}

impl AuthzEngine {
    pub fn new(store: Arc<dyn AuthzStore>, cache: AuthzCache) -> Self {
        Self {
            data_scope: DataScopeResolver::new(store.clone(), cache.clone()),
            permissions: PermissionResolver::new(store.clone(), cache.clone()),
            linkage: LinkageReducer::new(store.clone()),
            invalidator: CacheInvalidator::new(store, cache),
        }
    }

    /// Navigation routes for the user
    pub async fn routes_for(&self, user_id: i64) -> RepoResult<Vec<RouteNode>> {
        let menus = self.permissions.accessible_menus(user_id).await?;
        Ok(routes::build_routes(&menus))
    }
}
