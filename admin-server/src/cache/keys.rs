//! Typed cache keys
//!
//! Every per-user authorization entry is addressed through [`CacheKey`], so
//! invalidation sites cannot drift from the read sites.

use std::fmt;

/// Family of per-user entries sharing a key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    Permissions,
    Roles,
    DataScope,
    AccessibleDepts,
}

impl KeyFamily {
    pub const ALL: [KeyFamily; 4] = [
        KeyFamily::Permissions,
        KeyFamily::Roles,
        KeyFamily::DataScope,
        KeyFamily::AccessibleDepts,
    ];

    pub const fn prefix(self) -> &'static str {
        match self {
            KeyFamily::Permissions => "user:permissions:",
            KeyFamily::Roles => "user:roles:",
            KeyFamily::DataScope => "user:datascope:",
            KeyFamily::AccessibleDepts => "user:accessible_depts:",
        }
    }

    pub const fn key(self, user_id: i64) -> CacheKey {
        CacheKey {
            family: self,
            user_id,
        }
    }
}

/// Key of one cached per-user value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    family: KeyFamily,
    user_id: i64,
}

impl CacheKey {
    pub const fn permissions(user_id: i64) -> Self {
        KeyFamily::Permissions.key(user_id)
    }

    pub const fn roles(user_id: i64) -> Self {
        KeyFamily::Roles.key(user_id)
    }

    pub const fn data_scope(user_id: i64) -> Self {
        KeyFamily::DataScope.key(user_id)
    }

    pub const fn accessible_depts(user_id: i64) -> Self {
        KeyFamily::AccessibleDepts.key(user_id)
    }

    /// Every key cached for a user
    pub fn all_for_user(user_id: i64) -> [CacheKey; 4] {
        KeyFamily::ALL.map(|family| family.key(user_id))
    }

    pub const fn family(&self) -> KeyFamily {
        self.family
    }

    pub const fn user_id(&self) -> i64 {
        self.user_id
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.user_id)
    }
}
