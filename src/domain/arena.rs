use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::{Node, NodeId};
use crate::domain::error::DomainError;

/// Data payload for tree nodes: the nested-set node and its display name.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub node: Node,
    pub name: String,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.node.id)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in `lft` order
    pub children: Vec<Index>,
}

/// Arena-based forest materialized from a nested-set listing.
///
/// The nested set has no parent pointers; this rebuilds them once so the
/// hierarchy can be walked and rendered.
#[derive(Debug, Default)]
pub struct OrgForest {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
}

impl OrgForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest from nodes in pre-order (`lft` ascending).
    ///
    /// A stack of open intervals yields each node's parent: the nearest
    /// interval that has not closed yet.
    #[instrument(level = "debug", skip(nodes))]
    pub fn from_preorder(nodes: Vec<NodeData>) -> Result<Self, DomainError> {
        let mut forest = Self::new();
        let mut open: Vec<(Index, Node)> = Vec::new();

        for data in nodes {
            let node = data.node;
            while open.last().is_some_and(|(_, top)| top.rgt < node.lft) {
                open.pop();
            }
            let parent = match open.last() {
                Some((idx, top)) if top.contains(&node) => Some(*idx),
                Some((_, top)) => {
                    return Err(DomainError::Overlap {
                        outer: top.id,
                        inner: node.id,
                    })
                }
                None => None,
            };
            let idx = forest.insert_node(data, parent);
            open.push((idx, node));
        }

        Ok(forest)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn find(&self, id: NodeId) -> Option<Index> {
        self.arena
            .iter()
            .find(|(_, n)| n.data.node.id == id)
            .map(|(idx, _)| idx)
    }

    /// Ids of the direct children of `id`, via the materialized parent links.
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.find(id)
            .and_then(|idx| self.get_node(idx))
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| self.get_node(c))
                    .map(|c| c.data.node.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Number of levels in the deepest tree.
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Render each root as a `termtree` for terminal display.
    pub fn to_tree_strings(&self) -> Vec<Tree<String>> {
        self.roots
            .iter()
            .filter_map(|&root| self.build_tree(root))
            .collect()
    }

    fn build_tree(&self, node_idx: Index) -> Option<Tree<String>> {
        let node = self.get_node(node_idx)?;
        let leaves: Vec<_> = node
            .children
            .iter()
            .filter_map(|&child| self.build_tree(child))
            .collect();
        Some(Tree::new(node.data.to_string()).with_leaves(leaves))
    }
}

pub struct PreOrderIterator<'a> {
    forest: &'a OrgForest,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(forest: &'a OrgForest) -> Self {
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::seed::seed_nodes;

    fn seeded_forest() -> OrgForest {
        let mut nodes = seed_nodes();
        nodes.sort_by_key(|n| n.lft);
        let data = nodes
            .into_iter()
            .map(|node| NodeData {
                node,
                name: format!("n{}", node.id),
            })
            .collect();
        OrgForest::from_preorder(data).unwrap()
    }

    #[test]
    fn given_seed_tree_when_materializing_then_single_root_three_levels() {
        let forest = seeded_forest();
        assert_eq!(forest.roots().len(), 1);
        assert_eq!(forest.len(), 12);
        assert_eq!(forest.depth(), 3);
    }

    #[test]
    fn given_seed_tree_when_reading_children_then_matches_nested_set() {
        let forest = seeded_forest();
        let ids: Vec<i64> = forest.child_ids(NodeId(7)).iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![11, 8, 9]);
    }

    #[test]
    fn given_seed_tree_when_iterating_then_pre_order_equals_lft_order() {
        let forest = seeded_forest();
        let ids: Vec<i64> = forest.iter().map(|n| n.data.node.id.0).collect();
        assert_eq!(ids, vec![5, 1, 2, 3, 4, 6, 7, 11, 8, 9, 10, 12]);
    }

    #[test]
    fn given_overlapping_intervals_when_materializing_then_error() {
        let data = vec![
            NodeData {
                node: Node {
                    id: NodeId(1),
                    level: 1,
                    lft: 1,
                    rgt: 6,
                },
                name: "a".into(),
            },
            NodeData {
                node: Node {
                    id: NodeId(2),
                    level: 2,
                    lft: 4,
                    rgt: 8,
                },
                name: "b".into(),
            },
        ];
        let err = OrgForest::from_preorder(data).unwrap_err();
        assert_eq!(
            err,
            DomainError::Overlap {
                outer: NodeId(1),
                inner: NodeId(2)
            }
        );
    }

    #[test]
    fn given_forest_when_rendering_then_names_and_ids_in_tree() {
        let rendered = seeded_forest().to_tree_strings()[0].to_string();
        assert!(rendered.starts_with("n5 [5]"));
        assert!(rendered.contains("n8 [8]"));
    }
}
