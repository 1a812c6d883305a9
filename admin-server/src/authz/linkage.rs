//! Menu/department linkage reduction for tree-checkbox screens
//!
//! With strict linkage on, the UI derives a parent's checked state from its
//! children, so the stored set is shown reduced to nodes that are not the
//! parent of another assigned node.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::hierarchy::TreeNode;
use crate::db::{AuthzStore, RepoResult};

/// `assigned − { parent(m) | m ∈ assigned }`
///
/// Parent ids are looked up in `nodes`; assigned ids missing from `nodes`
/// are kept and contribute no parent. Idempotent.
pub fn reduce_to_leaves<N: TreeNode>(assigned: &BTreeSet<i64>, nodes: &[N]) -> BTreeSet<i64> {
    let parent_of: HashMap<i64, i64> = nodes
        .iter()
        .map(|n| (n.node_id(), n.parent_id()))
        .collect();
    let parents: BTreeSet<i64> = assigned
        .iter()
        .filter_map(|id| parent_of.get(id).copied())
        .collect();
    assigned.difference(&parents).copied().collect()
}

#[derive(Clone)]
pub struct LinkageReducer {
    store: Arc<dyn AuthzStore>,
}

impl LinkageReducer {
    pub fn new(store: Arc<dyn AuthzStore>) -> Self {
        Self { store }
    }

    /// Menu ids to render as checked for `role_id`
    ///
    /// Unknown role → empty set.
    pub async fn reduce_for_display(&self, role_id: i64) -> RepoResult<BTreeSet<i64>> {
        let Some(role) = self.store.find_role(role_id).await? else {
            return Ok(BTreeSet::new());
        };
        let assigned: BTreeSet<i64> = self
            .store
            .role_menu_ids(&[role_id])
            .await?
            .into_iter()
            .collect();
        if !role.menu_check_strictly {
            return Ok(assigned);
        }
        let menus = self.store.list_menus().await?;
        Ok(reduce_to_leaves(&assigned, &menus))
    }

    /// Department ids to render as checked for `role_id`
    pub async fn reduce_departments_for_display(&self, role_id: i64) -> RepoResult<BTreeSet<i64>> {
        let Some(role) = self.store.find_role(role_id).await? else {
            return Ok(BTreeSet::new());
        };
        let assigned: BTreeSet<i64> = self
            .store
            .role_dept_ids(&[role_id])
            .await?
            .into_iter()
            .collect();
        if !role.dept_check_strictly {
            return Ok(assigned);
        }
        let depts = self.store.list_departments().await?;
        Ok(reduce_to_leaves(&assigned, &depts))
    }
}
