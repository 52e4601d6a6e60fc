//! Sample data consumed by the index engine.
//!
//! - [GroupMap] interns sampling-group names to dense indices.
//! - [SampleTable] holds per-group taxon abundances and the global
//!   ranges/totals derived from them.
//! - [NeighbourSets] resolves one ordered pair of group sets, the unit of
//!   work for every calculation.

pub mod basedata;
pub mod group_map;
pub mod neighbours;

pub use basedata::SampleError;
pub use basedata::SampleTable;
pub use group_map::GroupIndex;
pub use group_map::GroupMap;
pub use neighbours::NeighbourSets;
