//! Dissimilarity indices over the ABC decomposition, and range-weighted
//! turnover.

use crate::calc::abc::AbcTuple;
use crate::calc::paths::PathLengths;
use crate::calc::ranges::RangeIndex;
use crate::calc::result::CalcResults;
use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use crate::sample::group_map::GroupIndex;
use crate::sample::neighbours::NeighbourSets;
use itertools::Itertools;
use std::collections::HashSet;

/// Sorenson dissimilarity: `1 - 2A/(2A+B+C)`.
///
/// `None` (no signal) when nothing is shared and a side is empty.
pub fn sorenson(abc: &AbcTuple) -> Option<f64> {
    if abc.no_signal() {
        return None;
    }
    Some(1.0 - 2.0 * abc.a / (2.0 * abc.a + abc.b + abc.c))
}

/// Jaccard dissimilarity: `1 - A/(A+B+C)`.
pub fn jaccard(abc: &AbcTuple) -> Option<f64> {
    if abc.no_signal() {
        return None;
    }
    Some(1.0 - abc.a / abc.total())
}

/// Simpson-type S2 dissimilarity: `1 - A/(A+min(B,C))`.
pub fn s2(abc: &AbcTuple) -> Option<f64> {
    if abc.no_signal() {
        return None;
    }
    Some(1.0 - abc.a / (abc.a + abc.b.min(abc.c)))
}

/// Writes `PHYLO_A/B/C`, `PHYLO_ABC` and the three dissimilarities
/// derived from them.
pub fn calc_phylo_abc(abc: &AbcTuple, results: &mut CalcResults) {
    results.insert_scalar("PHYLO_A", abc.a);
    results.insert_scalar("PHYLO_B", abc.b);
    results.insert_scalar("PHYLO_C", abc.c);
    results.insert_scalar("PHYLO_ABC", abc.total());
    results.insert_optional("PHYLO_SORENSON", sorenson(abc));
    results.insert_optional("PHYLO_JACCARD", jaccard(abc));
    results.insert_optional("PHYLO_S2", s2(abc));
}

/// Computes `PHYLO_RW_TURNOVER` and its components
/// (`PHYLO_RW_TURNOVER_A/B/C`).
///
/// Same decomposition idea as ABC, but the per-node weight is the
/// inverse-range-weighted length (branch / global range), and membership
/// comes from each node's range against the two neighbour sets rather
/// than from path merging. A node present in both sets is shared - and
/// so is every ancestor of it, necessarily, since a clade spanning both
/// sets spans them at every ancestor. Shared classification therefore
/// propagates rootward over any not-yet-processed ancestors; a done
/// marker keeps ancestors already classified by an earlier branch from
/// being reprocessed.
///
/// `singleton` carries the two group indices when the pair is singleton
/// (pairwise mode): membership tests then become direct bitset lookups.
pub fn calc_rw_turnover(
    tree: &PhyloTree,
    ranges: &RangeIndex,
    paths: &PathLengths,
    nbr: &NeighbourSets,
    singleton: Option<(GroupIndex, GroupIndex)>,
    results: &mut CalcResults,
) {
    let mut a = 0.0;
    let mut b = 0.0;
    let mut c = 0.0;
    let mut done: HashSet<NodeIndex> = HashSet::with_capacity(paths.len());

    // Deepest first, so shared classification sweeps whole root paths at
    // the first shared node it meets
    let order = paths
        .keys()
        .copied()
        .sorted_by(|&x, &y| tree[y].depth().cmp(&tree[x].depth()));

    for node in order {
        if done.contains(&node) {
            continue;
        }
        done.insert(node);

        let (in1, in2) = membership(ranges, node, nbr, singleton);
        let Some(weight) = rw_weight(ranges, paths, node) else {
            continue;
        };

        if in1 && in2 {
            a += weight;
            // Every unprocessed ancestor is shared as well
            let mut current = node;
            while let Some(parent) = tree[current].parent() {
                if done.contains(&parent) {
                    break;
                }
                done.insert(parent);
                if let Some(parent_weight) = rw_weight(ranges, paths, parent) {
                    a += parent_weight;
                }
                current = parent;
            }
        } else if in1 {
            b += weight;
        } else if in2 {
            c += weight;
        }
    }

    let rw = AbcTuple { a, b, c };
    results.insert_scalar("PHYLO_RW_TURNOVER_A", a);
    results.insert_scalar("PHYLO_RW_TURNOVER_B", b);
    results.insert_scalar("PHYLO_RW_TURNOVER_C", c);
    results.insert_optional("PHYLO_RW_TURNOVER", jaccard(&rw));
}

/// Inverse-range weight of a node: branch length / global range.
/// `None` for nodes outside the path set or with an empty range.
fn rw_weight(ranges: &RangeIndex, paths: &PathLengths, node: NodeIndex) -> Option<f64> {
    let length = paths.get(&node)?;
    let global = ranges.range_count(node);
    if global == 0 {
        return None;
    }
    Some(length / global as f64)
}

fn membership(
    ranges: &RangeIndex,
    node: NodeIndex,
    nbr: &NeighbourSets,
    singleton: Option<(GroupIndex, GroupIndex)>,
) -> (bool, bool) {
    match singleton {
        Some((group1, group2)) => (
            ranges.contains(node, group1),
            ranges.contains(node, group2),
        ),
        None => (
            ranges.local_range(node, nbr.bits1()) > 0,
            ranges.local_range(node, nbr.bits2()) > 0,
        ),
    }
}
