//! Subtree extraction and last-shared-ancestor lookup.
//!
//! Builds a reduced parent/child representation restricted to nodes
//! ancestral to a taxon set. The clade contribution engine propagates
//! over this adjacency, and the last shared ancestor scopes "central"
//! calculations.

use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use std::collections::HashMap;
use tracing::warn;

// =#========================================================================#=
// SUBTREE
// =#========================================================================#=
/// The induced subtree of a taxon set: every matched node plus all its
/// ancestors, with child lists restricted to the induced nodes.
#[derive(Debug, Default)]
pub struct Subtree {
    /// Node -> induced children (matched nodes appear with empty lists)
    children: HashMap<NodeIndex, Vec<NodeIndex>>,
    /// Node -> induced parent (absent for the subtree root)
    parents: HashMap<NodeIndex, NodeIndex>,
    /// Number of taxon names that matched a tree node
    num_matched: usize,
}

impl Subtree {
    /// Extracts the subtree induced by the given taxon names.
    ///
    /// For each name present on the tree, walks parent links toward the
    /// root, inserting each node into the adjacency and terminating as
    /// soon as an already-visited ancestor is reached - its continuation
    /// to the root is already recorded. Names absent from the tree are
    /// skipped.
    pub fn for_labels<'a>(
        tree: &PhyloTree,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Subtree {
        let mut subtree = Subtree::default();

        for label in labels {
            let Some(start) = tree.node_by_name(label) else {
                continue;
            };
            subtree.num_matched += 1;
            if subtree.children.contains_key(&start) {
                // Already on a recorded path
                continue;
            }
            subtree.children.entry(start).or_default();

            let mut current = start;
            while let Some(parent) = tree[current].parent() {
                let seen = subtree.children.contains_key(&parent);
                subtree.children.entry(parent).or_default().push(current);
                subtree.parents.insert(current, parent);
                if seen {
                    break;
                }
                current = parent;
            }
        }

        subtree
    }

    /// Returns the induced children of `node` (empty for matched taxa
    /// and for nodes outside the subtree).
    pub fn children_of(&self, node: NodeIndex) -> &[NodeIndex] {
        self.children.get(&node).map_or(&[], |v| v.as_slice())
    }

    /// Returns the induced parent of `node`, or `None` for the subtree
    /// root and for nodes outside the subtree.
    pub fn parent_of(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.parents.get(&node).copied()
    }

    /// Returns `true` if `node` is part of the subtree.
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.children.contains_key(&node)
    }

    /// Returns the number of nodes in the subtree.
    pub fn num_nodes(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if no taxon matched.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of taxon names that matched a tree node.
    pub fn num_matched(&self) -> usize {
        self.num_matched
    }

    /// Returns the subtree's node indices ordered by descending tree
    /// depth - the processing order of the clade engines.
    pub fn nodes_by_depth_desc(&self, tree: &PhyloTree) -> Vec<NodeIndex> {
        let mut order: Vec<NodeIndex> = self.children.keys().copied().collect();
        order.sort_by(|&a, &b| tree[b].depth().cmp(&tree[a].depth()));
        order
    }

    /// Checks the matched-taxon count against an expected count.
    ///
    /// A mismatch is reported but does not abort: partial label sets are
    /// a legitimate input (taxa absent from the tree, intentionally
    /// restricted analyses).
    pub fn check_expected_count(&self, expected: usize) -> bool {
        if self.num_matched != expected {
            warn!(
                matched = self.num_matched,
                expected, "subtree taxon count differs from expected count"
            );
            return false;
        }
        true
    }
}

/// Finds the last shared ancestor of the full taxon set behind `subtree`:
/// starting at the tree root, descends while the current node has exactly
/// one induced child. The first node with zero or two-plus induced
/// children is the deepest node ancestral to every matched taxon.
///
/// Returns `None` for an empty subtree.
pub fn last_shared_ancestor(tree: &PhyloTree, subtree: &Subtree) -> Option<NodeIndex> {
    if subtree.is_empty() {
        return None;
    }

    let mut current = tree.root_index();
    loop {
        let children = subtree.children_of(current);
        if children.len() == 1 {
            current = children[0];
        } else {
            return Some(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::BranchLength;

    // ((A,B)ab,(C,D)cd)root, unit lengths
    fn four_leaf_tree() -> PhyloTree {
        let mut tree = PhyloTree::new();
        let a = tree.add_terminal("A", Some(BranchLength::new(1.0))).unwrap();
        let b = tree.add_terminal("B", Some(BranchLength::new(1.0))).unwrap();
        let c = tree.add_terminal("C", Some(BranchLength::new(1.0))).unwrap();
        let d = tree.add_terminal("D", Some(BranchLength::new(1.0))).unwrap();
        let ab = tree
            .add_internal("ab", &[a, b], Some(BranchLength::new(1.0)))
            .unwrap();
        let cd = tree
            .add_internal("cd", &[c, d], Some(BranchLength::new(1.0)))
            .unwrap();
        let root = tree.add_internal("root", &[ab, cd], None).unwrap();
        tree.set_root(root).unwrap();
        tree.finalize().unwrap();
        tree
    }

    #[test]
    fn test_subtree_walks_stop_at_seen_ancestors() {
        let tree = four_leaf_tree();
        let subtree = Subtree::for_labels(&tree, ["A", "B"]);

        // A, B, ab, root
        assert_eq!(subtree.num_nodes(), 4);
        assert_eq!(subtree.num_matched(), 2);
        let ab = tree.node_by_name("ab").unwrap();
        assert_eq!(subtree.children_of(ab).len(), 2);
    }

    #[test]
    fn test_last_shared_ancestor_descends_single_child_chain() {
        let tree = four_leaf_tree();

        let subtree = Subtree::for_labels(&tree, ["A", "B"]);
        let lsa = last_shared_ancestor(&tree, &subtree).unwrap();
        assert_eq!(tree[lsa].name(), "ab");

        let subtree = Subtree::for_labels(&tree, ["A", "C"]);
        let lsa = last_shared_ancestor(&tree, &subtree).unwrap();
        assert_eq!(tree[lsa].name(), "root");

        let subtree = Subtree::for_labels(&tree, ["A"]);
        let lsa = last_shared_ancestor(&tree, &subtree).unwrap();
        assert_eq!(tree[lsa].name(), "A");
    }

    #[test]
    fn test_empty_subtree_has_no_ancestor() {
        let tree = four_leaf_tree();
        let subtree = Subtree::for_labels(&tree, std::iter::empty());
        assert!(last_shared_ancestor(&tree, &subtree).is_none());
    }
}
