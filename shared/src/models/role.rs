//! Role Model

use serde::{Deserialize, Serialize};

use super::DataScope;

/// Reserved id of the superuser role
pub const SUPER_ADMIN_ROLE_ID: i64 = 1;

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub role_name: String,
    /// Key used by role-based checks, e.g. `"admin"`, `"common"`
    pub role_key: String,
    pub role_sort: i32,
    pub data_scope: DataScope,
    /// Menu tree checkbox: persisted set is reduced to leaves
    pub menu_check_strictly: bool,
    /// Department tree checkbox: persisted set is reduced to leaves
    pub dept_check_strictly: bool,
    pub is_active: bool,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        self.id == SUPER_ADMIN_ROLE_ID
    }
}
