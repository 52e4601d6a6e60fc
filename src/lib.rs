//! Phylodiv computes phylogenetic diversity, endemism and turnover
//! indices over the branch structure of a tree.
//!
//! Given a phylogenetic tree and the sets of taxa observed in pairs of
//! spatial sampling units ("neighbour sets"), the engine evaluates a
//! family of indices per pair. Core functionality provided:
//! - Diversity: `PD`, `PD_P`, `PD_PER_TAXON`.
//! - Endemism: `PE_WE` and variants (`PE_WE_P`, `PE_WE_SINGLE`,
//!   `PE_CENTRAL`, `PD_ENDEMISM`).
//! - Turnover: `PHYLO_SORENSON`, `PHYLO_JACCARD`, `PHYLO_S2` over the
//!   shared/unique branch-length decomposition, and range-weighted
//!   `PHYLO_RW_TURNOVER`.
//! - Distinctiveness: per-terminal `ED`/`ES`/`AED` lists and the
//!   abundance-weighted `PHYLO_AED_T`.
//! - Clade structure: per-node contribution and loss shares of PD/PE.
//!
//! The engine is a pure computation library: it consumes a tree built
//! through [model::PhyloTree], an abundance table
//! ([sample::SampleTable]) and pairs of group sets
//! ([sample::NeighbourSets]), and returns a flat name -> value mapping
//! ([calc::CalcResults]) per pair. Parsing tree or occurrence files,
//! choosing which units are neighbours, and rendering results are all
//! left to the calling framework.
//!
//! # Batch behaviour
//! One [calc::CalcContext] owns the caches for one analysis run: the
//! trimmed tree, rootward path arrays, per-group path mappings, node
//! range bitsets and distinctiveness scores. All are written at most
//! once per key, so evaluating millions of pairs against one context
//! reuses rather than recomputes. For all-pairs regimes over singleton
//! groups, enable pairwise mode on the builder to switch the
//! shared/unique decomposition to cached-total subtraction.
//!
//! The engine is single-threaded by design; a pair's evaluation never
//! suspends, and a batch can be interrupted between pairs with no
//! cleanup. Runs must not share one context concurrently.
//!
//! # Usage patterns
//! 1. [calculate_pair] evaluates one pair with default settings.
//! 2. Configure a [calc::CalcContext] via
//!    [`CalcContext::builder`](calc::CalcContext::builder) for full
//!    control (pairwise mode, repeated pairs against shared caches).
//!
//! ## Example
//! ```
//! use phylodiv::model::{BranchLength, PhyloTree};
//! use phylodiv::sample::SampleTable;
//!
//! let mut tree = PhyloTree::new();
//! let a = tree.add_terminal("A", Some(BranchLength::new(1.0))).unwrap();
//! let b = tree.add_terminal("B", Some(BranchLength::new(1.0))).unwrap();
//! let root = tree.add_internal("root", &[a, b], None).unwrap();
//! tree.set_root(root).unwrap();
//! tree.finalize().unwrap();
//!
//! let mut table = SampleTable::new();
//! table.add_sample("north", "A", 2.0);
//! table.add_sample("south", "B", 1.0);
//!
//! let results = phylodiv::calculate_pair(&tree, &table, &["north"], &["south"]).unwrap();
//! assert_eq!(results.scalar("PD"), Some(2.0));
//! ```

pub mod calc;
pub mod model;
pub mod sample;

use crate::calc::{CalcContext, CalcError, CalcResults};
use crate::model::PhyloTree;
use crate::sample::SampleTable;

// ============================================================================
// Quick API
// ============================================================================
/// Evaluates all indices for a single neighbour-set pair using default
/// settings.
///
/// Builds a one-shot [CalcContext]; for batches, build the context
/// yourself so its caches carry across pairs.
///
/// # Errors
/// Returns [CalcError::EmptyTree] if tree and table share no taxa, or
/// [CalcError::Sample](calc::CalcError::Sample) for unknown group names.
pub fn calculate_pair(
    tree: &PhyloTree,
    table: &SampleTable,
    set1: &[&str],
    set2: &[&str],
) -> Result<CalcResults, CalcError> {
    let mut context = CalcContext::builder(tree, table).build()?;
    let pair = context.neighbour_sets(set1, set2)?;
    context.calc_pair(&pair)
}
