//! Node range index: which groups contain each clade.
//!
//! For every tree node, the set of sampling groups whose taxa include
//! that node or any descendant. Built once per (trimmed tree, table)
//! pair, bottom-up in descending depth order, and cached for the run;
//! every endemism and turnover calculator reads it.

use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use crate::sample::basedata::SampleTable;
use crate::sample::group_map::GroupMap;
use fixedbitset::FixedBitSet;
use tracing::debug;

// =#========================================================================#=
// RANGE INDEX
// =#========================================================================#=
/// Per-node group-membership bitsets over one tree.
///
/// The canonical result is the per-node membership bitset; counts and
/// name lists are derived from it on demand so the three views can never
/// disagree. Ranges are monotone: an ancestor's range is a superset of
/// the union of its children's ranges.
#[derive(Debug)]
pub struct RangeIndex {
    /// Per node (by arena index), the groups containing its clade
    ranges: Vec<FixedBitSet>,
    /// Group universe size, for the full-range short-circuit
    num_groups: usize,
}

impl RangeIndex {
    /// Builds the range index for `tree` against `table`.
    ///
    /// Nodes are processed in descending depth order, so every child's
    /// range exists before its parent unions them - no recursion. The
    /// union over children short-circuits once a node's range covers
    /// every group in the dataset.
    pub fn build(tree: &PhyloTree, table: &SampleTable) -> RangeIndex {
        let num_groups = table.num_groups();
        let mut ranges = vec![FixedBitSet::with_capacity(num_groups); tree.num_nodes()];

        for index in tree.nodes_by_depth_desc() {
            let node = &tree[index];
            if node.is_terminal() {
                for &group in table.groups_for_label(node.name()) {
                    ranges[index].insert(group);
                }
                continue;
            }

            let mut accumulated = FixedBitSet::with_capacity(num_groups);
            for &child in node.children() {
                accumulated.union_with(&ranges[child]);
                if accumulated.count_ones(..) == num_groups {
                    // Already everywhere; remaining children cannot add more
                    break;
                }
            }
            ranges[index] = accumulated;
        }

        debug!(
            nodes = tree.num_nodes(),
            groups = num_groups,
            "built node range index"
        );

        RangeIndex { ranges, num_groups }
    }

    /// Returns the membership bitset of `node` (the canonical view).
    pub fn range(&self, node: NodeIndex) -> &FixedBitSet {
        &self.ranges[node]
    }

    /// Returns the number of groups containing `node`'s clade
    /// (its global range size).
    pub fn range_count(&self, node: NodeIndex) -> usize {
        self.ranges[node].count_ones(..)
    }

    /// Returns the number of groups in `within` that contain `node`'s
    /// clade (its local range with respect to a neighbour-set pair).
    pub fn local_range(&self, node: NodeIndex, within: &FixedBitSet) -> usize {
        self.ranges[node].intersection_count(within)
    }

    /// Returns `true` if `group` contains `node`'s clade.
    pub fn contains(&self, node: NodeIndex, group: usize) -> bool {
        self.ranges[node].contains(group)
    }

    /// Returns the names of the groups containing `node`'s clade.
    pub fn range_groups<'a>(&self, node: NodeIndex, groups: &'a GroupMap) -> Vec<&'a str> {
        self.ranges[node]
            .ones()
            .filter_map(|g| groups.get_name(g))
            .collect()
    }

    /// Returns the group universe size this index was built against.
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }
}
