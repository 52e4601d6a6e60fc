//! Result types returned per evaluated neighbour-set pair.

use std::collections::HashMap;

// =#========================================================================#=
// INDEX VALUE
// =#========================================================================#=
/// One named index result: a scalar, an explicit "no value", or a
/// node-keyed mapping (for per-clade list results).
///
/// `Undefined` is produced wherever a formula's denominator collapses
/// (zero tree length, zero richness, vacuous comparison); it is a valid
/// ecological outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndexValue {
    /// A defined scalar result
    Scalar(f64),
    /// The formula has no defined value for this input
    Undefined,
    /// A per-node list result, keyed by node name
    NodeMap(HashMap<String, f64>),
}

impl IndexValue {
    /// Returns the scalar value, or `None` for `Undefined` and node maps.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            IndexValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the node map, or `None` for scalars.
    pub fn as_node_map(&self) -> Option<&HashMap<String, f64>> {
        match self {
            IndexValue::NodeMap(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` if this is the explicit "no value" result.
    pub fn is_undefined(&self) -> bool {
        matches!(self, IndexValue::Undefined)
    }
}

impl From<Option<f64>> for IndexValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => IndexValue::Scalar(v),
            None => IndexValue::Undefined,
        }
    }
}

// =#========================================================================#=
// CALC RESULTS
// =#========================================================================#=
/// Flat mapping from index name (e.g. `PD`, `PHYLO_SORENSON`) to its
/// [IndexValue], returned per evaluated pair.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CalcResults {
    values: HashMap<&'static str, IndexValue>,
}

impl CalcResults {
    /// Creates an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a defined scalar under `name`.
    pub fn insert_scalar(&mut self, name: &'static str, value: f64) {
        self.values.insert(name, IndexValue::Scalar(value));
    }

    /// Stores a scalar that may be undefined under `name`.
    pub fn insert_optional(&mut self, name: &'static str, value: Option<f64>) {
        self.values.insert(name, value.into());
    }

    /// Stores a per-node list result under `name`.
    pub fn insert_node_map(&mut self, name: &'static str, map: HashMap<String, f64>) {
        self.values.insert(name, IndexValue::NodeMap(map));
    }

    /// Stores an explicit "no value" under `name`.
    pub fn insert_undefined(&mut self, name: &'static str) {
        self.values.insert(name, IndexValue::Undefined);
    }

    /// Returns the value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&IndexValue> {
        self.values.get(name)
    }

    /// Returns the defined scalar under `name`; `None` if absent,
    /// undefined, or a node map.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(IndexValue::as_scalar)
    }

    /// Returns `true` if `name` is present and explicitly undefined.
    pub fn is_undefined(&self, name: &str) -> bool {
        self.get(name).is_some_and(IndexValue::is_undefined)
    }

    /// Iterates over all (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &IndexValue)> {
        self.values.iter().map(|(&name, value)| (name, value))
    }

    /// Returns the number of stored indices.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no index has been stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
