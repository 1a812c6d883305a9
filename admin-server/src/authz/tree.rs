//! Checkbox-tree projections for role editing screens

use shared::models::{Department, Menu, TreeSelect};

use super::hierarchy::{ChildIndex, TreeNode};

fn build<N: TreeNode>(nodes: &[N], project: &dyn Fn(&N) -> (String, bool)) -> Vec<TreeSelect> {
    let index = ChildIndex::new(nodes);
    index
        .roots(nodes)
        .into_iter()
        .map(|root| project_node(&index, root, project))
        .collect()
}

fn project_node<N: TreeNode>(
    index: &ChildIndex<'_, N>,
    node: &N,
    project: &dyn Fn(&N) -> (String, bool),
) -> TreeSelect {
    let (label, disabled) = project(node);
    TreeSelect {
        id: node.node_id(),
        label,
        disabled,
        children: index
            .children_of(node.node_id())
            .iter()
            .map(|child| project_node(index, *child, project))
            .collect(),
    }
}

/// Nested menu tree over every menu kind
///
/// Nodes whose parent is not in the list become roots, so a filtered list
/// still renders.
pub fn build_menu_tree(menus: &[Menu]) -> Vec<TreeSelect> {
    build(menus, &|m: &Menu| (m.menu_name.clone(), false))
}

/// Nested department tree; disabled departments render disabled
pub fn build_dept_tree(departments: &[Department]) -> Vec<TreeSelect> {
    build(departments, &|d: &Department| {
        (d.dept_name.clone(), !d.is_active)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, parent_id: i64, is_active: bool) -> Department {
        Department {
            id,
            parent_id,
            ancestors: String::new(),
            dept_name: format!("dept-{id}"),
            order_num: 0,
            is_active,
        }
    }

    #[test]
    fn test_dept_tree_nests_and_flags_disabled() {
        let depts = vec![dept(1, 0, true), dept(2, 1, false), dept(3, 2, true), dept(4, 0, true)];
        let tree = build_dept_tree(&depts);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 1);
        assert_eq!(tree[0].children[0].id, 2);
        assert!(tree[0].children[0].disabled);
        assert_eq!(tree[0].children[0].children[0].label, "dept-3");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphans_become_roots() {
        let depts = vec![dept(2, 1, true), dept(3, 2, true)];
        let tree = build_dept_tree(&depts);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 2);
        assert_eq!(tree[0].children[0].id, 3);
    }
}
