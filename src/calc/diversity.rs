//! Phylogenetic diversity and endemism calculators.
//!
//! All calculators take their prerequisites (path mappings, range index)
//! as explicit parameters and write named results into a
//! [CalcResults]; zero denominators produce
//! [Undefined](crate::calc::result::IndexValue::Undefined), never errors.

use crate::calc::paths::PathLengths;
use crate::calc::ranges::RangeIndex;
use crate::calc::result::CalcResults;
use crate::model::node::NodeIndex;
use crate::sample::neighbours::NeighbourSets;
use std::collections::HashMap;

/// Computes `PD`, `PD_P` and `PD_PER_TAXON` from the merged path of both
/// neighbour sets.
///
/// - `PD` - sum of branch lengths on the merged to-root paths
/// - `PD_P` - PD as a proportion of the total tree length
/// - `PD_PER_TAXON` - PD divided by the pair's richness
pub fn calc_pd(
    paths: &PathLengths,
    richness: usize,
    total_tree_length: f64,
    results: &mut CalcResults,
) {
    let pd: f64 = paths.values().sum();

    results.insert_scalar("PD", pd);
    results.insert_optional("PD_P", ratio(pd, total_tree_length));
    results.insert_optional("PD_PER_TAXON", ratio(pd, richness as f64));
}

/// Computes the per-branch endemism weights for a path mapping:
/// branch length x local range / global range.
///
/// `local` counts the sampled groups (within the compared pair) that
/// contain the branch; `global` counts its groups across the whole
/// dataset. Branches with an empty global range carry no weight.
pub fn pe_weights(
    ranges: &RangeIndex,
    paths: &PathLengths,
    nbr: &NeighbourSets,
) -> HashMap<NodeIndex, f64> {
    let mut weights = HashMap::with_capacity(paths.len());
    for (&node, &length) in paths {
        let global = ranges.range_count(node);
        if global == 0 {
            continue;
        }
        let local = ranges.local_range(node, nbr.bits_combined());
        weights.insert(node, length * local as f64 / global as f64);
    }
    weights
}

/// Computes the endemism block: `PE_WE`, `PE_WE_P`, `PE_WE_SINGLE`,
/// `PE_CENTRAL`, `PE_CENTRAL_P` and `PD_ENDEMISM`.
///
/// `weights` must be the [pe_weights] of `paths` (shared with the clade
/// engine so the two can never disagree). The central variant restricts
/// the branch set to paths reachable from neighbour set 1 while keeping
/// the combined local ranges; PD-endemism sums only branches found
/// nowhere outside the sample.
pub fn calc_pe(
    ranges: &RangeIndex,
    paths: &PathLengths,
    paths_set1: &PathLengths,
    weights: &HashMap<NodeIndex, f64>,
    nbr: &NeighbourSets,
    total_tree_length: f64,
    results: &mut CalcResults,
) {
    let pe: f64 = weights.values().sum();

    let mut pe_single = 0.0;
    let mut pd_endemism = 0.0;
    for (&node, &length) in paths {
        let global = ranges.range_count(node);
        if global == 0 {
            continue;
        }
        pe_single += length / global as f64;
        if ranges.local_range(node, nbr.bits_combined()) == global {
            pd_endemism += length;
        }
    }

    let pe_central: f64 = paths_set1
        .keys()
        .filter_map(|node| weights.get(node))
        .sum();

    results.insert_scalar("PE_WE", pe);
    results.insert_optional("PE_WE_P", ratio(pe, total_tree_length));
    results.insert_scalar("PE_WE_SINGLE", pe_single);
    results.insert_scalar("PE_CENTRAL", pe_central);
    results.insert_optional("PE_CENTRAL_P", ratio(pe_central, total_tree_length));
    results.insert_scalar("PD_ENDEMISM", pd_endemism);
}

/// Guarded division: `None` when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}
