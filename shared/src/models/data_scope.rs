//! Data Scope Model
//!
//! The breadth of department-scoped rows a role's holder may see.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data scope kind carried by a role
///
/// Variants are declared from most to least permissive, but aggregation
/// never relies on declaration order or on the stored code; it goes through
/// [`DataScope::permissiveness_rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DataScope {
    /// Every enabled department
    All,
    /// Explicit role ↔ department grants
    Custom,
    /// The holder's own department
    Department,
    /// The holder's own department and all of its descendants
    DepartmentAndBelow,
    /// Own department only, combined with an owner check by the caller
    #[serde(rename = "self")]
    #[cfg_attr(feature = "db", sqlx(rename = "self"))]
    SelfOnly,
}

impl DataScope {
    /// All scope kinds, most permissive first
    pub const ALL: [DataScope; 5] = [
        DataScope::All,
        DataScope::Custom,
        DataScope::Department,
        DataScope::DepartmentAndBelow,
        DataScope::SelfOnly,
    ];

    /// Permissiveness ranking: lower means broader
    pub const fn permissiveness_rank(self) -> u8 {
        match self {
            DataScope::All => 0,
            DataScope::Custom => 1,
            DataScope::Department => 2,
            DataScope::DepartmentAndBelow => 3,
            DataScope::SelfOnly => 4,
        }
    }

    /// Returns whichever of the two scopes is more permissive
    pub fn broader(self, other: DataScope) -> DataScope {
        if other.permissiveness_rank() < self.permissiveness_rank() {
            other
        } else {
            self
        }
    }

    /// Most permissive scope across a set of roles, `None` when empty
    pub fn most_permissive<I>(scopes: I) -> Option<DataScope>
    where
        I: IntoIterator<Item = DataScope>,
    {
        scopes.into_iter().reduce(DataScope::broader)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DataScope::All => "all",
            DataScope::Custom => "custom",
            DataScope::Department => "department",
            DataScope::DepartmentAndBelow => "department_and_below",
            DataScope::SelfOnly => "self",
        }
    }
}

impl fmt::Display for DataScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown data scope name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data scope: {0}")]
pub struct UnknownDataScope(pub String);

impl FromStr for DataScope {
    type Err = UnknownDataScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| UnknownDataScope(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_permissive_picks_all() {
        let scope = DataScope::most_permissive([DataScope::Department, DataScope::All]);
        assert_eq!(scope, Some(DataScope::All));
    }

    #[test]
    fn test_most_permissive_follows_ranking() {
        let scope = DataScope::most_permissive([
            DataScope::SelfOnly,
            DataScope::DepartmentAndBelow,
            DataScope::Custom,
        ]);
        assert_eq!(scope, Some(DataScope::Custom));

        let scope =
            DataScope::most_permissive([DataScope::DepartmentAndBelow, DataScope::Department]);
        assert_eq!(scope, Some(DataScope::Department));
    }

    #[test]
    fn test_most_permissive_empty() {
        assert_eq!(DataScope::most_permissive([]), None);
    }

    #[test]
    fn test_ranking_is_total() {
        for pair in DataScope::ALL.windows(2) {
            assert!(pair[0].permissiveness_rank() < pair[1].permissiveness_rank());
        }
    }

    #[test]
    fn test_parse_and_display() {
        for scope in DataScope::ALL {
            assert_eq!(scope.to_string().parse::<DataScope>(), Ok(scope));
        }
        assert!("everything".parse::<DataScope>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&DataScope::SelfOnly).unwrap(),
            "\"self\""
        );
        let scope: DataScope = serde_json::from_str("\"department_and_below\"").unwrap();
        assert_eq!(scope, DataScope::DepartmentAndBelow);
    }
}
