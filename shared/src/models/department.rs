//! Department Model

use serde::{Deserialize, Serialize};

/// Department entity
///
/// `ancestors` is the comma-joined id chain from the root down to (but not
/// including) this department, e.g. `"0,1,4"`. Root departments carry `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Department {
    pub id: i64,
    pub parent_id: i64,
    pub ancestors: String,
    pub dept_name: String,
    pub order_num: i32,
    pub is_active: bool,
}
