//! ABC decomposition of merged branch lengths.
//!
//! Partitions the union of two taxon sets' to-root paths into three
//! disjoint branch-length sums: shared (A), unique to set 1 (B), unique
//! to set 2 (C). The dissimilarity indices in
//! [turnover](crate::calc::turnover) are all functions of this tuple.

use crate::calc::paths::{PathCache, PathLengths};
use crate::model::tree::PhyloTree;
use crate::sample::basedata::SampleTable;
use crate::sample::group_map::GroupIndex;

// =#========================================================================#=
// ABC TUPLE
// =#========================================================================#=
/// Shared / unique-to-1 / unique-to-2 branch-length sums.
///
/// Invariant: `a + b + c` equals the total branch length touched by the
/// union of the two sets' paths (cross-checked in tests).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AbcTuple {
    /// Branch length shared by both sets
    pub a: f64,
    /// Branch length unique to set 1
    pub b: f64,
    /// Branch length unique to set 2
    pub c: f64,
}

impl AbcTuple {
    /// Returns the total branch length of the path union.
    pub fn total(&self) -> f64 {
        self.a + self.b + self.c
    }

    /// Returns `true` when the decomposition carries no comparable
    /// signal: nothing is shared and at least one side is empty. All
    /// dissimilarity indices are undefined in exactly this case.
    pub fn no_signal(&self) -> bool {
        self.a == 0.0 && (self.b == 0.0 || self.c == 0.0)
    }
}

/// Decomposes two path mappings directly (general mode).
///
/// Works for any pair of path mappings, regardless of how many groups
/// contributed to each side.
pub fn abc_general(paths1: &PathLengths, paths2: &PathLengths) -> AbcTuple {
    let mut abc = AbcTuple::default();

    for (node, &length) in paths1 {
        if let Some(&other) = paths2.get(node) {
            debug_assert_eq!(length, other);
            abc.a += length;
        } else {
            abc.b += length;
        }
    }
    for (node, &length) in paths2 {
        if !paths1.contains_key(node) {
            abc.c += length;
        }
    }

    abc
}

/// Decomposes a singleton-group pair using cached per-group totals
/// (pairwise batch mode).
///
/// Computes only the intersection sum A, iterating the smaller of the two
/// mappings, and derives B and C by subtraction from the cached per-group
/// path totals. This avoids the O(n) full set difference per pair and is
/// the dominant performance lever in all-pairs analyses.
///
/// Precondition: each side is exactly one group. Callers hold the
/// precondition by construction
/// ([CalcContext](crate::calc::context::CalcContext) rejects the fast
/// path otherwise).
pub fn abc_pairwise(
    cache: &mut PathCache,
    tree: &PhyloTree,
    table: &SampleTable,
    group1: GroupIndex,
    group2: GroupIndex,
) -> AbcTuple {
    let paths1 = cache.group_path_lengths(tree, table, group1);
    let paths2 = cache.group_path_lengths(tree, table, group2);
    let total1 = cache.group_path_total(tree, table, group1);
    let total2 = cache.group_path_total(tree, table, group2);

    let (smaller, larger) = if paths1.len() <= paths2.len() {
        (&paths1, &paths2)
    } else {
        (&paths2, &paths1)
    };

    let mut a = 0.0;
    for (node, &length) in smaller.iter() {
        if larger.contains_key(node) {
            a += length;
        }
    }

    // Clamp against accumulated float noise on near-identical groups
    AbcTuple {
        a,
        b: (total1 - a).max(0.0),
        c: (total2 - a).max(0.0),
    }
}
