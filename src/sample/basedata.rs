//! Abundance/occurrence table consumed by the index engine.

use crate::sample::group_map::{GroupIndex, GroupMap};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when resolving sample data.
#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    /// A group name was requested that the table has never seen
    #[error("unknown group: {0}")]
    UnknownGroup(String),
}

// =#========================================================================#=
// SAMPLE TABLE
// =#========================================================================#=
/// Per-group taxon abundances plus the global views derived from them.
///
/// Rows are sampling groups (spatial units), columns are taxon labels;
/// cells hold abundances (sample counts). The table also maintains, per
/// label, the list of groups it occurs in (its *global range*) and its
/// summed global abundance, both kept current as samples are added.
///
/// # Example
/// ```
/// use phylodiv::sample::SampleTable;
///
/// let mut table = SampleTable::new();
/// table.add_sample("north", "Petroica longipes", 3.0);
/// table.add_sample("north", "Mohoua albicilla", 1.0);
/// table.add_sample("south", "Petroica longipes", 2.0);
///
/// assert_eq!(table.num_groups(), 2);
/// assert_eq!(table.label_range("Petroica longipes"), 2);
/// assert_eq!(table.global_abundance("Petroica longipes"), 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    /// Group name interning
    groups: GroupMap,
    /// Per-group label -> abundance, indexed by [GroupIndex]
    samples: Vec<HashMap<String, f64>>,
    /// Per-label sorted list of groups containing it (global range)
    label_groups: HashMap<String, Vec<GroupIndex>>,
    /// Per-label summed abundance across all groups
    label_totals: HashMap<String, f64>,
}

impl SampleTable {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `abundance` of `label` in `group`, creating the group on
    /// first sight. Repeated calls for the same cell accumulate.
    pub fn add_sample(&mut self, group: &str, label: &str, abundance: f64) {
        let group_index = self.groups.get_or_insert(group);
        if group_index == self.samples.len() {
            self.samples.push(HashMap::new());
        }

        *self.samples[group_index]
            .entry(label.to_string())
            .or_insert(0.0) += abundance;

        *self.label_totals.entry(label.to_string()).or_insert(0.0) += abundance;

        // Occurrence counts for the range even at zero abundance
        let range = self.label_groups.entry(label.to_string()).or_default();
        if !range.contains(&group_index) {
            range.push(group_index);
            range.sort_unstable();
        }
    }

    /// Returns the group interning map.
    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// Returns the number of groups in the table.
    pub fn num_groups(&self) -> usize {
        self.groups.num_groups()
    }

    /// Resolves a group name to its index.
    ///
    /// # Errors
    /// Returns [SampleError::UnknownGroup] for a name never added.
    pub fn group_index(&self, name: &str) -> Result<GroupIndex, SampleError> {
        self.groups
            .get_index(name)
            .ok_or_else(|| SampleError::UnknownGroup(name.to_string()))
    }

    /// Returns the label -> abundance map of one group.
    ///
    /// # Panics
    /// Panics if `group` is out of bounds.
    pub fn labels_in_group(&self, group: GroupIndex) -> &HashMap<String, f64> {
        &self.samples[group]
    }

    /// Returns the groups containing `label` (its global range), sorted,
    /// or an empty slice for an unseen label.
    pub fn groups_for_label(&self, label: &str) -> &[GroupIndex] {
        self.label_groups.get(label).map_or(&[], |v| v.as_slice())
    }

    /// Returns the number of groups containing `label` (its global range
    /// size).
    pub fn label_range(&self, label: &str) -> usize {
        self.groups_for_label(label).len()
    }

    /// Returns the summed abundance of `label` across all groups.
    pub fn global_abundance(&self, label: &str) -> f64 {
        self.label_totals.get(label).copied().unwrap_or(0.0)
    }

    /// Returns `true` if `label` occurs anywhere in the table.
    pub fn contains_label(&self, label: &str) -> bool {
        self.label_totals.contains_key(label)
    }

    /// Returns an iterator over all distinct labels in the table.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.label_totals.keys().map(|s| s.as_str())
    }

    /// Returns the number of distinct labels in the table.
    pub fn num_labels(&self) -> usize {
        self.label_totals.len()
    }
}
