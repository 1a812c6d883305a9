//! Error categories

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain of an error, taken from the leading digit of its code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    /// Permission strings, role checks and data scope
    Permission,
    /// Department hierarchy edits
    Department,
    Menu,
    /// Users and roles (5xxx-8xxx)
    Account,
    System,
}

impl ErrorCategory {
    pub const fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Department,
            4 => Self::Menu,
            5..=8 => Self::Account,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2006), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Department);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(8101), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::DataScopeDenied.category(),
            ErrorCategory::Permission
        );
        assert_eq!(
            ErrorCode::DepartmentParentDisabled.category(),
            ErrorCategory::Department
        );
        assert_eq!(ErrorCode::MenuNotFound.category(), ErrorCategory::Menu);
        assert_eq!(ErrorCode::RoleIsSystem.category(), ErrorCategory::Account);
        assert_eq!(ErrorCode::CacheError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Department).unwrap();
        assert_eq!(json, "\"department\"");

        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}
