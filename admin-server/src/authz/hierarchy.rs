//! Hierarchy Codec
//!
//! Departments store their position in the tree as an ancestors chain: the
//! comma-joined ids from the virtual root `0` down to (excluding) the node.
//! Menus only carry a parent id. This module owns the chain encoding, the
//! parent/child predicates shared by every tree walk, and the planner that
//! keeps chains consistent when a subtree is moved.
//!
//! # Invariant
//!
//! For every department `d` with parent `p`:
//! `ancestors(d) == ancestors(p) + "," + p.id`, and root departments carry `"0"`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use shared::models::{Department, Menu};
use thiserror::Error;

/// Id of the virtual root every top-level node hangs from
pub const ROOT_ID: i64 = 0;

const DELIMITER: char = ',';

/// Hierarchy errors raised by edit planning
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("Malformed ancestors chain: {0:?}")]
    Malformed(String),

    #[error("Node {0} not found")]
    NodeNotFound(i64),

    #[error("Parent {0} not found")]
    ParentNotFound(i64),

    #[error("Node {id} cannot be placed under {parent_id}")]
    InvalidParent { id: i64, parent_id: i64 },

    #[error("Parent {0} is disabled")]
    ParentDisabled(i64),
}

/// Parsed ancestors chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Ancestors(Vec<i64>);

impl Ancestors {
    /// Chain of a top-level node
    pub fn root() -> Self {
        Self(vec![ROOT_ID])
    }

    /// Parses a stored chain; malformed input collapses to "no ancestry"
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Chain of a direct child of the node owning `self`
    pub fn child(&self, parent_id: i64) -> Self {
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.extend_from_slice(&self.0);
        ids.push(parent_id);
        Self(ids)
    }

    /// Replaces everything up to and including `moved_id` with `new_prefix`
    ///
    /// Returns `None` when `moved_id` is not part of the chain.
    pub fn rebase(&self, moved_id: i64, new_prefix: &Ancestors) -> Option<Self> {
        let pos = self.0.iter().position(|&id| id == moved_id)?;
        let mut ids = new_prefix.0.clone();
        ids.extend_from_slice(&self.0[pos + 1..]);
        Some(Self(ids))
    }
}

impl FromStr for Ancestors {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(HierarchyError::Malformed(s.to_string()));
        }
        trimmed
            .split(DELIMITER)
            .map(|token| token.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| HierarchyError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Ancestors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{DELIMITER}")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// True iff the chain contains `candidate_ancestor_id` as a whole token
///
/// `"1,2"` does not contain `12`. Empty or malformed chains have no ancestry.
pub fn is_descendant(ancestors: &str, candidate_ancestor_id: i64) -> bool {
    ancestors
        .parse::<Ancestors>()
        .is_ok_and(|chain| chain.contains(candidate_ancestor_id))
}

/// Chain for a direct child of the node `(parent_ancestors, parent_id)`
pub fn append_child(parent_ancestors: &str, parent_id: i64) -> String {
    Ancestors::parse_lossy(parent_ancestors)
        .child(parent_id)
        .to_string()
}

/// A node of a parent-id encoded tree
pub trait TreeNode {
    fn node_id(&self) -> i64;
    fn parent_id(&self) -> i64;
}

impl TreeNode for Department {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.parent_id
    }
}

impl TreeNode for Menu {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> i64 {
        self.parent_id
    }
}

impl<N: TreeNode> TreeNode for &N {
    fn node_id(&self) -> i64 {
        (*self).node_id()
    }

    fn parent_id(&self) -> i64 {
        (*self).parent_id()
    }
}

pub fn is_top_level<N: TreeNode>(node: &N) -> bool {
    node.parent_id() == ROOT_ID
}

pub fn is_immediate_child<N: TreeNode>(node: &N, parent_id: i64) -> bool {
    node.parent_id() == parent_id
}

/// Parent → children index over a flat node list
///
/// Built once per request so tree walks stay linear in the node count.
/// Children keep the order of the input slice.
pub struct ChildIndex<'a, N> {
    children: HashMap<i64, Vec<&'a N>>,
    ids: HashSet<i64>,
}

impl<'a, N: TreeNode> ChildIndex<'a, N> {
    pub fn new(nodes: &'a [N]) -> Self {
        let mut children: HashMap<i64, Vec<&'a N>> = HashMap::new();
        let mut ids = HashSet::with_capacity(nodes.len());
        for node in nodes {
            ids.insert(node.node_id());
            children.entry(node.parent_id()).or_default().push(node);
        }
        Self { children, ids }
    }

    pub fn children_of(&self, parent_id: i64) -> &[&'a N] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_children(&self, parent_id: i64) -> bool {
        !self.children_of(parent_id).is_empty()
    }

    /// Nodes whose parent is absent from the list, in input order
    ///
    /// For a complete tree these are the top-level nodes; for a filtered
    /// list they are the highest visible nodes.
    pub fn roots(&self, nodes: &'a [N]) -> Vec<&'a N> {
        nodes
            .iter()
            .filter(|node| !self.ids.contains(&node.parent_id()))
            .collect()
    }
}

/// One row to rewrite after a hierarchy edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorsUpdate {
    pub id: i64,
    /// New parent, only set for the moved node itself
    pub parent_id: Option<i64>,
    pub ancestors: String,
}

/// Plans every chain rewrite needed to move `dept_id` under `new_parent_id`
///
/// The first update is the moved node; the rest are its descendants, found
/// by token match on the moved id. Moving a node under itself or under one
/// of its descendants is rejected, as is moving it under a disabled parent.
pub fn plan_reparent(
    departments: &[Department],
    dept_id: i64,
    new_parent_id: i64,
) -> Result<Vec<AncestorsUpdate>, HierarchyError> {
    let node = departments
        .iter()
        .find(|d| d.id == dept_id)
        .ok_or(HierarchyError::NodeNotFound(dept_id))?;

    if new_parent_id == dept_id {
        return Err(HierarchyError::InvalidParent {
            id: dept_id,
            parent_id: new_parent_id,
        });
    }

    let new_chain = if new_parent_id == ROOT_ID {
        Ancestors::root()
    } else {
        let parent = departments
            .iter()
            .find(|d| d.id == new_parent_id)
            .ok_or(HierarchyError::ParentNotFound(new_parent_id))?;
        if is_descendant(&parent.ancestors, dept_id) {
            return Err(HierarchyError::InvalidParent {
                id: dept_id,
                parent_id: new_parent_id,
            });
        }
        if !parent.is_active {
            return Err(HierarchyError::ParentDisabled(new_parent_id));
        }
        Ancestors::parse_lossy(&parent.ancestors).child(parent.id)
    };

    let descendant_prefix = new_chain.child(node.id);
    let mut updates = vec![AncestorsUpdate {
        id: node.id,
        parent_id: Some(new_parent_id),
        ancestors: new_chain.to_string(),
    }];

    for dept in departments.iter().filter(|d| d.id != dept_id) {
        let chain = Ancestors::parse_lossy(&dept.ancestors);
        if let Some(rebased) = chain.rebase(dept_id, &descendant_prefix) {
            updates.push(AncestorsUpdate {
                id: dept.id,
                parent_id: None,
                ancestors: rebased.to_string(),
            });
        }
    }

    Ok(updates)
}

/// Ids of departments whose chain disagrees with their parent's
///
/// Departments whose parent is missing from the list are reported too,
/// unless they hang from the virtual root.
pub fn find_inconsistent(departments: &[Department]) -> Vec<i64> {
    let by_id: HashMap<i64, &Department> = departments.iter().map(|d| (d.id, d)).collect();
    departments
        .iter()
        .filter(|dept| {
            let expected = if dept.parent_id == ROOT_ID {
                Some(Ancestors::root().to_string())
            } else {
                by_id
                    .get(&dept.parent_id)
                    .map(|parent| append_child(&parent.ancestors, parent.id))
            };
            expected.as_deref() != Some(dept.ancestors.as_str())
        })
        .map(|dept| dept.id)
        .collect()
}
