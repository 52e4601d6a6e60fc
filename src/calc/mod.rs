//! The index engine: caches, decompositions and calculators.
//!
//! # Data flow
//! [PathCache] and [RangeIndex] are derived from the trimmed tree and the
//! sample table; [AbcTuple](abc::AbcTuple) decompositions and the
//! diversity/turnover calculators consume them; the clade engine
//! propagates the resulting weight maps over the induced [Subtree].
//! [CalcContext] owns all of it and drives one pair at a time.
//!
//! Calculators take their prerequisites as explicit parameters, so each
//! one can also be used directly with inputs prepared elsewhere.

pub mod abc;
pub mod clade;
pub mod context;
pub mod distinct;
pub mod diversity;
pub mod error;
pub mod paths;
pub mod ranges;
pub mod result;
pub mod subtree;
pub mod turnover;

pub use abc::AbcTuple;
pub use abc::abc_general;
pub use abc::abc_pairwise;
pub use clade::calc_clade;
pub use context::CalcContext;
pub use context::CalcContextBuilder;
pub use distinct::DistinctCache;
pub use error::CalcError;
pub use paths::PathCache;
pub use paths::PathLengths;
pub use ranges::RangeIndex;
pub use result::CalcResults;
pub use result::IndexValue;
pub use subtree::Subtree;
pub use subtree::last_shared_ancestor;
pub use turnover::jaccard;
pub use turnover::s2;
pub use turnover::sorenson;
