//! Tree select model for checkbox-tree widgets

use serde::{Deserialize, Serialize};

/// A node of a checkbox tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSelect {
    pub id: i64,
    pub label: String,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSelect>,
}

/// Response body for role tree-checkbox screens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedTree {
    /// Ids rendered as checked
    pub checked_keys: Vec<i64>,
    pub tree: Vec<TreeSelect>,
}
