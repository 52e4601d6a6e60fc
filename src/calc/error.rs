//! Error types for the index engine.
//!
//! Only *structural* problems are errors: a missing prerequisite, an
//! unknown group, a tree that shares no taxa with the sample table, or a
//! violated fast-path precondition. Arithmetic edge cases (zero
//! denominators) are not errors - they produce
//! [IndexValue::Undefined](crate::calc::result::IndexValue::Undefined)
//! in place, since absence of signal is a valid outcome.

use crate::model::tree::TreeError;
use crate::sample::basedata::SampleError;
use thiserror::Error;

/// Errors that abort a single index calculation.
///
/// The orchestrating caller decides whether to skip the pair or abort the
/// whole batch.
#[derive(Debug, Error)]
pub enum CalcError {
    /// A required input was absent
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// The tree and the sample table share no taxa, or the tree is empty
    #[error("tree has no sampled terminals")]
    EmptyTree,

    /// The pairwise fast path was requested for a pair where a side holds
    /// more than one group
    #[error("pairwise mode requires exactly one group per side")]
    PairwiseModePrecondition,

    /// A group or label could not be resolved against the sample table
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// The tree failed a structural check
    #[error(transparent)]
    Tree(#[from] TreeError),
}
