//! Group map module for sampling-unit bookkeeping.
//!
//! - `GroupMap`: Joined storage and lookup for sampling-group names.

use std::collections::HashMap;
use std::fmt;

/// Index of a sampling group in a [GroupMap].
pub type GroupIndex = usize;

// =#========================================================================#=
// GROUP MAP
// =#========================================================================#=
/// Maps sampling-group names (strings) to compact indices.
///
/// This bidirectional mapping lets the engine key its caches and range
/// bitsets on small dense integers while the API edges keep speaking group
/// names. Names are deduplicated automatically - inserting the same name
/// twice returns the same index.
///
/// # Example
/// ```
/// use phylodiv::sample::GroupMap;
///
/// let mut groups = GroupMap::new();
///
/// let idx_a = groups.get_or_insert("cell_12:34");  // idx_a = 0
/// let idx_b = groups.get_or_insert("cell_12:35");  // idx_b = 1
/// let idx_a2 = groups.get_or_insert("cell_12:34"); // idx_a2 = 0 (deduplicated)
///
/// assert_eq!(idx_a, idx_a2);
/// assert_eq!(groups.get_name(idx_a), Some("cell_12:34"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    /// List of unique group names
    names: Vec<String>,
    /// Map from group name to its index
    map: HashMap<String, GroupIndex>,
}

impl GroupMap {
    /// Creates a new, empty GroupMap.
    pub fn new() -> Self {
        GroupMap {
            names: Vec::new(),
            map: HashMap::new(),
        }
    }

    /// Gets the index for a group name, inserting it if it doesn't exist.
    ///
    /// If the name already exists, returns its existing index.
    /// If the name is new, assigns it the next available index.
    ///
    /// # Arguments
    /// * `name` - The group name to look up or insert
    ///
    /// # Returns
    /// The index associated with this group
    pub fn get_or_insert(&mut self, name: &str) -> GroupIndex {
        if let Some(&index) = self.map.get(name) {
            index
        } else {
            let index = self.names.len();
            self.names.push(name.to_string());
            self.map.insert(name.to_string(), index);
            index
        }
    }

    /// Retrieves the index for a given group name.
    ///
    /// # Returns
    /// `Some(index)` if the group exists, `None` otherwise
    pub fn get_index(&self, name: &str) -> Option<GroupIndex> {
        self.map.get(name).copied()
    }

    /// Retrieves the group name for a given index.
    ///
    /// # Returns
    /// `Some(&str)` if the index is valid, `None` otherwise
    pub fn get_name(&self, index: GroupIndex) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    /// Checks if a group name exists in the map.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Returns the number of groups currently stored.
    pub fn num_groups(&self) -> usize {
        self.names.len()
    }

    /// Returns reference to the group names in this map.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for GroupMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "GroupMap ({} groups):", self.names.len())?;
        for (index, name) in self.names.iter().enumerate() {
            writeln!(f, "  [{}] {}", index, name)?;
        }
        Ok(())
    }
}

impl std::ops::Index<GroupIndex> for GroupMap {
    type Output = str;

    fn index(&self, index: GroupIndex) -> &Self::Output {
        &self.names[index]
    }
}
