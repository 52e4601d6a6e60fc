//! Path-length cache: merged to-root paths for taxon sets.
//!
//! For a set of taxon names, [PathCache::path_lengths] returns the mapping
//! from every node on the paths to the root to that node's own branch
//! length, merged across all given taxa. Sums over the mapping therefore
//! count each branch exactly once, no matter how many taxa share it.
//!
//! Three cache layers amortize the rootward walks across a batch:
//! - per-node ancestor arrays (any node visited once keeps its full path),
//! - per-single-group finished mappings (`Rc`-shared, O(1) on re-query),
//! - per-single-group path totals (the pairwise ABC lever, see
//!   [abc](crate::calc::abc)).

use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use crate::sample::basedata::SampleTable;
use crate::sample::group_map::GroupIndex;
use std::collections::HashMap;
use std::rc::Rc;

/// Mapping from node index to that node's branch length, for every node
/// on the merged to-root paths of a taxon set.
pub type PathLengths = HashMap<NodeIndex, f64>;

// =#========================================================================#=
// PATH CACHE
// =#========================================================================#=
/// Memoized rootward path walks over one tree.
///
/// Owned by the calculation context; keys are stable node indices and
/// group indices, written at most once and read-only thereafter.
#[derive(Debug, Default)]
pub struct PathCache {
    /// Per node, the node itself plus all its ancestors up to the root
    ancestors: Vec<Option<Box<[NodeIndex]>>>,
    /// Finished mappings for single-group queries
    by_group: HashMap<GroupIndex, Rc<PathLengths>>,
    /// Summed path lengths for single groups (pairwise ABC input)
    totals: HashMap<GroupIndex, f64>,
}

impl PathCache {
    /// Creates a cache for a tree with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        PathCache {
            ancestors: vec![None; num_nodes],
            by_group: HashMap::new(),
            totals: HashMap::new(),
        }
    }

    /// Returns the merged to-root path lengths for the given taxon names.
    ///
    /// Names absent from the tree are skipped; an empty set (or a set of
    /// all-absent names) yields an empty mapping, not an error. Taxa
    /// sharing ancestors contribute each shared branch only once: each
    /// walk early-exits at the first ancestor already present in the
    /// result.
    pub fn path_lengths<'a>(
        &mut self,
        tree: &PhyloTree,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> PathLengths {
        let mut merged = PathLengths::new();
        for label in labels {
            if let Some(node) = tree.node_by_name(label) {
                self.merge_path(tree, node, &mut merged);
            }
        }
        merged
    }

    /// Returns the (cached) path lengths for all labels of a single group.
    ///
    /// The finished mapping is shared via `Rc`; repeated queries for the
    /// same group - the common case in all-pairs regimes - are O(1).
    pub fn group_path_lengths(
        &mut self,
        tree: &PhyloTree,
        table: &SampleTable,
        group: GroupIndex,
    ) -> Rc<PathLengths> {
        if let Some(cached) = self.by_group.get(&group) {
            return Rc::clone(cached);
        }

        let mut merged = PathLengths::new();
        for label in table.labels_in_group(group).keys() {
            if let Some(node) = tree.node_by_name(label) {
                self.merge_path(tree, node, &mut merged);
            }
        }

        let shared = Rc::new(merged);
        self.by_group.insert(group, Rc::clone(&shared));
        shared
    }

    /// Returns the (cached) sum of path lengths for a single group.
    pub fn group_path_total(
        &mut self,
        tree: &PhyloTree,
        table: &SampleTable,
        group: GroupIndex,
    ) -> f64 {
        if let Some(&total) = self.totals.get(&group) {
            return total;
        }

        let total = self.group_path_lengths(tree, table, group).values().sum();
        self.totals.insert(group, total);
        total
    }

    /// Merges one node's path into `out`, stopping at the first ancestor
    /// already recorded.
    fn merge_path(&mut self, tree: &PhyloTree, node: NodeIndex, out: &mut PathLengths) {
        self.ensure_ancestors(tree, node);
        // Filled by ensure_ancestors above
        let Some(path) = self.ancestors[node].as_ref() else {
            return;
        };

        for &current in path.iter() {
            if out.contains_key(&current) {
                break;
            }
            out.insert(current, tree[current].length());
        }
    }

    /// Fills the ancestor array (node itself first, root last) for `node`.
    fn ensure_ancestors(&mut self, tree: &PhyloTree, node: NodeIndex) {
        if self.ancestors[node].is_some() {
            return;
        }

        let mut path = Vec::with_capacity(tree[node].depth() + 1);
        let mut current = node;
        loop {
            path.push(current);
            match tree[current].parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        self.ancestors[node] = Some(path.into_boxed_slice());
    }
}

/// Merges two path mappings into their union.
///
/// Lengths agree wherever keys overlap (both sides read the same tree),
/// so the union is a plain overwrite-free extend.
pub fn merge_paths(paths1: &PathLengths, paths2: &PathLengths) -> PathLengths {
    let mut merged = paths1.clone();
    for (&node, &length) in paths2 {
        merged.entry(node).or_insert(length);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::BranchLength;

    fn two_leaf_tree() -> PhyloTree {
        let mut tree = PhyloTree::new();
        let a = tree.add_terminal("A", Some(BranchLength::new(1.0))).unwrap();
        let b = tree.add_terminal("B", Some(BranchLength::new(2.0))).unwrap();
        let root = tree.add_internal("root", &[a, b], None).unwrap();
        tree.set_root(root).unwrap();
        tree.finalize().unwrap();
        tree
    }

    #[test]
    fn test_empty_label_set_yields_empty_mapping() {
        let tree = two_leaf_tree();
        let mut cache = PathCache::new(tree.num_nodes());
        let paths = cache.path_lengths(&tree, std::iter::empty());
        assert!(paths.is_empty());
    }

    #[test]
    fn test_shared_ancestors_counted_once() {
        let tree = two_leaf_tree();
        let mut cache = PathCache::new(tree.num_nodes());
        let paths = cache.path_lengths(&tree, ["A", "B"]);

        // A, B and the root, each exactly once
        assert_eq!(paths.len(), 3);
        let total: f64 = paths.values().sum();
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_unknown_labels_are_skipped() {
        let tree = two_leaf_tree();
        let mut cache = PathCache::new(tree.num_nodes());
        let paths = cache.path_lengths(&tree, ["A", "Zealandia"]);
        assert_eq!(paths.len(), 2); // A and the root
    }
}
