//! Row filtering by accessible department set
//!
//! Entities opt in to department scoping through [`DepartmentScoped`]; the
//! filter never inspects rows by reflection or by column name guessing.

use std::collections::BTreeSet;
use std::fmt;

use shared::models::{Department, Menu, User};

/// Entity carrying a department reference
pub trait DepartmentScoped {
    /// `false` for entity types that are not subject to department scoping
    const SCOPED: bool = true;

    fn department_id(&self) -> Option<i64>;
}

/// Entity carrying an owner reference (second half of the Self scope)
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl DepartmentScoped for User {
    fn department_id(&self) -> Option<i64> {
        self.dept_id
    }
}

impl Owned for User {
    fn owner_id(&self) -> i64 {
        self.id
    }
}

impl DepartmentScoped for Department {
    fn department_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl DepartmentScoped for Menu {
    const SCOPED: bool = false;

    fn department_id(&self) -> Option<i64> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Unrestricted,
    RejectAll,
    Departments(BTreeSet<i64>),
}

/// Predicate over rows of `E`
pub struct RowFilter<E> {
    rule: Rule,
    /// Required owner and how to read it from a row
    owner: Option<(i64, fn(&E) -> i64)>,
}

impl<E> Clone for RowFilter<E> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            owner: self.owner,
        }
    }
}

impl<E> fmt::Debug for RowFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowFilter")
            .field("rule", &self.rule)
            .field("owner", &self.owner.map(|(id, _)| id))
            .finish()
    }
}

/// Builds the filter for `E` from an accessible department set
///
/// Empty set rejects every row; unscoped entity types pass unchanged.
/// Superusers bypass filtering before reaching here.
pub fn build_filter<E: DepartmentScoped>(accessible: &BTreeSet<i64>) -> RowFilter<E> {
    let rule = if !E::SCOPED {
        Rule::Unrestricted
    } else if accessible.is_empty() {
        Rule::RejectAll
    } else {
        Rule::Departments(accessible.clone())
    };
    RowFilter { rule, owner: None }
}

impl<E: DepartmentScoped> RowFilter<E> {
    /// Identity filter
    pub fn unrestricted() -> Self {
        Self {
            rule: Rule::Unrestricted,
            owner: None,
        }
    }

    pub fn is_reject_all(&self) -> bool {
        self.rule == Rule::RejectAll
    }

    pub fn is_unrestricted(&self) -> bool {
        self.rule == Rule::Unrestricted && self.owner.is_none()
    }

    pub fn allows(&self, row: &E) -> bool {
        let dept_ok = match &self.rule {
            Rule::Unrestricted => true,
            Rule::RejectAll => false,
            Rule::Departments(set) => row.department_id().is_some_and(|id| set.contains(&id)),
        };
        dept_ok
            && self
                .owner
                .is_none_or(|(owner, owner_of)| owner_of(row) == owner)
    }

    /// Keeps the rows the filter allows, preserving order
    pub fn apply(&self, rows: Vec<E>) -> Vec<E> {
        rows.into_iter().filter(|row| self.allows(row)).collect()
    }

    /// Renders the filter as a SQL condition
    ///
    /// `None` means no condition is needed.
    pub fn sql_condition(&self, dept_column: &str, owner_column: &str) -> Option<String> {
        let dept = match &self.rule {
            Rule::Unrestricted => None,
            Rule::RejectAll => return Some("1 = 0".to_string()),
            Rule::Departments(set) => {
                let ids: Vec<String> = set.iter().map(i64::to_string).collect();
                Some(format!("{dept_column} IN ({})", ids.join(", ")))
            }
        };
        let owner = self.owner.map(|(id, _)| format!("{owner_column} = {id}"));
        match (dept, owner) {
            (Some(d), Some(o)) => Some(format!("{d} AND {o}")),
            (d, o) => d.or(o),
        }
    }
}

impl<E: DepartmentScoped + Owned> RowFilter<E> {
    /// Narrows the filter to rows owned by `user_id`
    pub fn owned_by(mut self, user_id: i64) -> Self {
        let owner_of: fn(&E) -> i64 = E::owner_id;
        self.owner = Some((user_id, owner_of));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, dept_id: Option<i64>) -> User {
        User {
            id,
            dept_id,
            user_name: format!("user{id}"),
            nick_name: String::new(),
            is_active: true,
        }
    }

    fn ids(users: &[User]) -> Vec<i64> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_empty_set_rejects_everything() {
        let filter = build_filter::<User>(&BTreeSet::new());
        assert!(filter.is_reject_all());
        assert!(filter.apply(vec![user(1, Some(1))]).is_empty());
        assert_eq!(filter.sql_condition("d.id", "u.id").as_deref(), Some("1 = 0"));
    }

    #[test]
    fn test_keeps_rows_in_set() {
        let filter = build_filter::<User>(&[10, 11].into());
        let rows = vec![user(1, Some(10)), user(2, Some(12)), user(3, None), user(4, Some(11))];
        assert_eq!(ids(&filter.apply(rows)), vec![1, 4]);
        assert_eq!(
            filter.sql_condition("u.dept_id", "u.id").as_deref(),
            Some("u.dept_id IN (10, 11)")
        );
    }

    #[test]
    fn test_unscoped_entities_pass_through() {
        let filter = build_filter::<Menu>(&BTreeSet::new());
        assert!(!filter.is_reject_all());
        assert!(filter.is_unrestricted());
        assert_eq!(filter.sql_condition("dept_id", "owner"), None);
    }

    #[test]
    fn test_owner_check() {
        let filter = build_filter::<User>(&[10].into()).owned_by(2);
        let rows = vec![user(1, Some(10)), user(2, Some(10)), user(3, Some(10))];
        assert_eq!(ids(&filter.apply(rows)), vec![2]);
        assert_eq!(
            filter.sql_condition("u.dept_id", "u.id").as_deref(),
            Some("u.dept_id IN (10) AND u.id = 2")
        );
    }

    #[test]
    fn test_departments_filter_themselves() {
        let filter = build_filter::<Department>(&[2].into());
        let dept = |id| Department {
            id,
            parent_id: 0,
            ancestors: "0".into(),
            dept_name: String::new(),
            order_num: 0,
            is_active: true,
        };
        assert!(filter.allows(&dept(2)));
        assert!(!filter.allows(&dept(3)));
    }

    #[test]
    fn test_unrestricted() {
        let filter = RowFilter::<User>::unrestricted();
        assert_eq!(filter.apply(vec![user(1, None)]).len(), 1);
    }
}
