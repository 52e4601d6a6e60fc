//! Neighbour-set pairs: the per-evaluation input of the engine.

use crate::sample::basedata::{SampleError, SampleTable};
use crate::sample::group_map::GroupIndex;
use fixedbitset::FixedBitSet;
use std::collections::HashMap;

// =#========================================================================#=
// NEIGHBOUR SETS
// =#========================================================================#=
/// An ordered pair of sampling-group sets with their merged label
/// abundances, resolved against a [SampleTable].
///
/// Set 1 is conventionally the processing group itself and set 2 its
/// spatial neighbours; how the sets were chosen is the caller's business.
/// Either side may hold a single group - the common case in pairwise,
/// all-pairs analyses - or several.
#[derive(Debug, Clone)]
pub struct NeighbourSets {
    groups1: Vec<GroupIndex>,
    groups2: Vec<GroupIndex>,
    /// Membership bitsets sized to the table's group count
    bits1: FixedBitSet,
    bits2: FixedBitSet,
    bits_combined: FixedBitSet,
    /// Merged label -> abundance per side and combined
    labels1: HashMap<String, f64>,
    labels2: HashMap<String, f64>,
    labels_combined: HashMap<String, f64>,
}

impl NeighbourSets {
    /// Resolves two sets of group names against `table` and merges their
    /// label abundances.
    ///
    /// # Errors
    /// Returns [SampleError::UnknownGroup] if any name is absent from the
    /// table.
    pub fn from_group_names(
        table: &SampleTable,
        set1: &[&str],
        set2: &[&str],
    ) -> Result<Self, SampleError> {
        let groups1 = resolve(table, set1)?;
        let groups2 = resolve(table, set2)?;

        let num_groups = table.num_groups();
        let mut bits1 = FixedBitSet::with_capacity(num_groups);
        let mut bits2 = FixedBitSet::with_capacity(num_groups);
        for &g in &groups1 {
            bits1.insert(g);
        }
        for &g in &groups2 {
            bits2.insert(g);
        }
        let mut bits_combined = bits1.clone();
        bits_combined.union_with(&bits2);

        let labels1 = merge_labels(table, &groups1);
        let labels2 = merge_labels(table, &groups2);
        // Merge over the group union: a group on both sides counts once
        let union: Vec<GroupIndex> = bits_combined.ones().collect();
        let labels_combined = merge_labels(table, &union);

        Ok(NeighbourSets {
            groups1,
            groups2,
            bits1,
            bits2,
            bits_combined,
            labels1,
            labels2,
            labels_combined,
        })
    }

    /// Returns the group indices of set 1.
    pub fn groups1(&self) -> &[GroupIndex] {
        &self.groups1
    }

    /// Returns the group indices of set 2.
    pub fn groups2(&self) -> &[GroupIndex] {
        &self.groups2
    }

    /// Returns the membership bitset of set 1.
    pub fn bits1(&self) -> &FixedBitSet {
        &self.bits1
    }

    /// Returns the membership bitset of set 2.
    pub fn bits2(&self) -> &FixedBitSet {
        &self.bits2
    }

    /// Returns the membership bitset of both sets combined.
    pub fn bits_combined(&self) -> &FixedBitSet {
        &self.bits_combined
    }

    /// Returns the merged label -> abundance mapping of set 1.
    pub fn labels1(&self) -> &HashMap<String, f64> {
        &self.labels1
    }

    /// Returns the merged label -> abundance mapping of set 2.
    pub fn labels2(&self) -> &HashMap<String, f64> {
        &self.labels2
    }

    /// Returns the merged label -> abundance mapping across both sets.
    pub fn labels_combined(&self) -> &HashMap<String, f64> {
        &self.labels_combined
    }

    /// Returns `true` when both sides hold exactly one group - the
    /// precondition for the pairwise batch fast paths.
    pub fn is_singleton_pair(&self) -> bool {
        self.groups1.len() == 1 && self.groups2.len() == 1
    }

    /// Returns the two group indices when this is a singleton pair.
    pub fn singleton_groups(&self) -> Option<(GroupIndex, GroupIndex)> {
        if self.is_singleton_pair() {
            Some((self.groups1[0], self.groups2[0]))
        } else {
            None
        }
    }
}

fn resolve(table: &SampleTable, names: &[&str]) -> Result<Vec<GroupIndex>, SampleError> {
    names.iter().map(|name| table.group_index(name)).collect()
}

fn merge_labels(table: &SampleTable, groups: &[GroupIndex]) -> HashMap<String, f64> {
    let mut merged = HashMap::new();
    for &group in groups {
        for (label, abundance) in table.labels_in_group(group) {
            *merged.entry(label.clone()).or_insert(0.0) += abundance;
        }
    }
    merged
}
