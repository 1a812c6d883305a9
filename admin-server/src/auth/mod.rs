//! Authentication context and permission middleware
//!
//! Token handling lives upstream; the authenticated user id arrives in the
//! [`USER_ID_HEADER`] header.
//!
//! - [`CurrentUser`] - current user context
//! - [`require_auth`] - resolves the current user
//! - [`require_permission`] - permission check middleware
//! - [`require_any_permission`] - any-of permission check middleware

pub mod extractor;
pub mod middleware;

pub use middleware::{require_any_permission, require_auth, require_permission};

use std::collections::BTreeSet;
use std::sync::Arc;

use shared::models::is_super_admin;

use crate::authz::permission::{grants_any_permission, grants_permission};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub user_name: String,
    /// Resolved permission strings
    pub permissions: Arc<BTreeSet<String>>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        is_super_admin(self.id)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        if permission.trim().is_empty() {
            return false;
        }
        self.is_admin() || grants_permission(&self.permissions, permission)
    }

    /// Blank entries are ignored; an all-blank list is never granted
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        if permissions.iter().all(|p| p.trim().is_empty()) {
            return false;
        }
        self.is_admin() || grants_any_permission(&self.permissions, permissions)
    }
}
