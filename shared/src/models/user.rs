//! User Model

use serde::{Deserialize, Serialize};

/// Reserved id of the superuser
pub const SUPER_ADMIN_USER_ID: i64 = 1;

/// Returns true if the user id is the reserved superuser id
#[inline]
pub fn is_super_admin(user_id: i64) -> bool {
    user_id == SUPER_ADMIN_USER_ID
}

/// User entity (read-only to the authorization engine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    /// Home department
    pub dept_id: Option<i64>,
    pub user_name: String,
    pub nick_name: String,
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        is_super_admin(self.id)
    }
}

/// Response body of the current-user info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: User,
    /// Role keys
    pub roles: Vec<String>,
    /// Permission strings
    pub permissions: Vec<String>,
}
