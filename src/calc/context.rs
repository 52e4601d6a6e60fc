//! Calculation context: cache ownership and per-pair orchestration.
//!
//! A [CalcContext] owns everything one analysis run shares across pairs:
//! the trimmed tree, the path-length cache, the node range index and the
//! distinctiveness cache. Caches are written at most once per key and
//! read-only thereafter; one run owns one context, so no locking is
//! needed (see the concurrency notes in the crate docs).
//!
//! Configuration happens before use via [CalcContextBuilder], in the
//! builder-then-run style the rest of the crate follows; mode flags are
//! fixed at build time rather than branching per call.

use crate::calc::abc::{AbcTuple, abc_general, abc_pairwise};
use crate::calc::clade::{PD_CLADE, PE_CLADE, calc_clade};
use crate::calc::distinct::{DistinctCache, calc_distinct};
use crate::calc::diversity::{calc_pd, calc_pe, pe_weights};
use crate::calc::error::CalcError;
use crate::calc::paths::{PathCache, PathLengths, merge_paths};
use crate::calc::ranges::RangeIndex;
use crate::calc::result::CalcResults;
use crate::calc::subtree::Subtree;
use crate::calc::turnover::{calc_phylo_abc, calc_rw_turnover};
use crate::model::tree::PhyloTree;
use crate::model::trim::{TrimmedTree, trim_to_table};
use crate::sample::basedata::SampleTable;
use crate::sample::neighbours::NeighbourSets;
use tracing::trace;

// =#========================================================================#=
// CALC CONTEXT BUILDER
// =#========================================================================#=
/// Configures a [CalcContext].
///
/// # Example
/// ```no_run
/// use phylodiv::calc::CalcContext;
/// # fn demo(tree: &phylodiv::model::PhyloTree, table: &phylodiv::sample::SampleTable)
/// #     -> Result<(), phylodiv::calc::CalcError> {
/// let mut context = CalcContext::builder(tree, table)
///     .pairwise_mode()
///     .build()?;
///
/// let pair = context.neighbour_sets(&["cell_1"], &["cell_2"])?;
/// let results = context.calc_pair(&pair)?;
/// println!("PD = {:?}", results.scalar("PD"));
/// # Ok(())
/// # }
/// ```
pub struct CalcContextBuilder<'a> {
    tree: &'a PhyloTree,
    table: &'a SampleTable,
    pairwise_mode: bool,
}

impl<'a> CalcContextBuilder<'a> {
    /// Enables the pairwise batch fast paths.
    ///
    /// Only valid for runs where every evaluated pair holds exactly one
    /// group per side; [CalcContext::calc_pair] rejects other pairs with
    /// [CalcError::PairwiseModePrecondition].
    pub fn pairwise_mode(mut self) -> Self {
        self.pairwise_mode = true;
        self
    }

    /// Trims the tree against the table and builds the context.
    ///
    /// # Errors
    /// Returns [CalcError::EmptyTree] if the tree and table share no
    /// taxa, or a [CalcError::Tree] if the tree was never finalized.
    pub fn build(self) -> Result<CalcContext<'a>, CalcError> {
        use crate::model::tree::TreeError;

        let tree = match trim_to_table(self.tree, self.table) {
            Ok(trimmed) => trimmed,
            Err(TreeError::NoOverlap) => return Err(CalcError::EmptyTree),
            Err(err) => return Err(err.into()),
        };

        let num_nodes = tree.tree().num_nodes();
        let total_tree_length = tree.tree().total_length();

        Ok(CalcContext {
            tree,
            table: self.table,
            pairwise_mode: self.pairwise_mode,
            paths: PathCache::new(num_nodes),
            ranges: None,
            distinct: None,
            total_tree_length,
        })
    }
}

// =#========================================================================#=
// CALC CONTEXT
// =#========================================================================#=
/// Owns the per-run caches and evaluates neighbour-set pairs.
pub struct CalcContext<'a> {
    tree: TrimmedTree<'a>,
    table: &'a SampleTable,
    pairwise_mode: bool,
    paths: PathCache,
    ranges: Option<RangeIndex>,
    distinct: Option<DistinctCache>,
    total_tree_length: f64,
}

impl<'a> CalcContext<'a> {
    /// Starts configuring a context for one tree + table pair.
    pub fn builder(tree: &'a PhyloTree, table: &'a SampleTable) -> CalcContextBuilder<'a> {
        CalcContextBuilder {
            tree,
            table,
            pairwise_mode: false,
        }
    }

    /// Returns the (trimmed) tree this context computes over.
    pub fn tree(&self) -> &PhyloTree {
        self.tree.tree()
    }

    /// Returns the total branch length of the trimmed tree.
    pub fn total_tree_length(&self) -> f64 {
        self.total_tree_length
    }

    /// Returns `true` if the pairwise fast paths are enabled.
    pub fn is_pairwise_mode(&self) -> bool {
        self.pairwise_mode
    }

    /// Resolves a pair of group-name sets against this context's table.
    pub fn neighbour_sets(
        &self,
        set1: &[&str],
        set2: &[&str],
    ) -> Result<NeighbourSets, CalcError> {
        Ok(NeighbourSets::from_group_names(self.table, set1, set2)?)
    }

    /// Computes the ABC decomposition for one pair, using the pairwise
    /// batch mode when enabled.
    ///
    /// # Errors
    /// Returns [CalcError::PairwiseModePrecondition] if pairwise mode is
    /// on but a side holds more than one group.
    pub fn calc_abc(&mut self, nbr: &NeighbourSets) -> Result<AbcTuple, CalcError> {
        if self.pairwise_mode {
            let (group1, group2) = nbr
                .singleton_groups()
                .ok_or(CalcError::PairwiseModePrecondition)?;
            return Ok(abc_pairwise(
                &mut self.paths,
                self.tree.tree(),
                self.table,
                group1,
                group2,
            ));
        }

        let paths1 = self
            .paths
            .path_lengths(self.tree.tree(), nbr.labels1().keys().map(|s| s.as_str()));
        let paths2 = self
            .paths
            .path_lengths(self.tree.tree(), nbr.labels2().keys().map(|s| s.as_str()));
        Ok(abc_general(&paths1, &paths2))
    }

    /// Returns the merged to-root path lengths for a set of labels.
    pub fn path_lengths<'b>(
        &mut self,
        labels: impl IntoIterator<Item = &'b str>,
    ) -> PathLengths {
        self.paths.path_lengths(self.tree.tree(), labels)
    }

    /// Evaluates every index for one neighbour-set pair.
    ///
    /// Prerequisites (paths, ranges, ABC) are computed first and handed
    /// to each calculator explicitly; the result is the flat name ->
    /// value mapping described in the crate docs.
    pub fn calc_pair(&mut self, nbr: &NeighbourSets) -> Result<CalcResults, CalcError> {
        // Mutable phase: fill every cache this pair needs
        self.ensure_ranges();
        self.ensure_distinct();

        let paths1 = self
            .paths
            .path_lengths(self.tree.tree(), nbr.labels1().keys().map(|s| s.as_str()));
        let paths2 = self
            .paths
            .path_lengths(self.tree.tree(), nbr.labels2().keys().map(|s| s.as_str()));
        let paths = merge_paths(&paths1, &paths2);

        let abc = if self.pairwise_mode {
            self.calc_abc(nbr)?
        } else {
            abc_general(&paths1, &paths2)
        };

        // Read-only phase
        let tree = self.tree.tree();
        let ranges = self
            .ranges
            .as_ref()
            .ok_or(CalcError::MissingArgument("node range index"))?;
        let distinct = self
            .distinct
            .as_ref()
            .ok_or(CalcError::MissingArgument("distinctiveness cache"))?;

        let richness = nbr
            .labels_combined()
            .keys()
            .filter(|label| tree.contains_name(label.as_str()))
            .count();

        trace!(
            richness,
            branches = paths.len(),
            "evaluating neighbour-set pair"
        );

        let mut results = CalcResults::new();

        calc_pd(&paths, richness, self.total_tree_length, &mut results);

        let weights = pe_weights(ranges, &paths, nbr);
        calc_pe(
            ranges,
            &paths,
            &paths1,
            &weights,
            nbr,
            self.total_tree_length,
            &mut results,
        );

        calc_phylo_abc(&abc, &mut results);
        calc_rw_turnover(
            tree,
            ranges,
            &paths,
            nbr,
            nbr.singleton_groups().filter(|_| self.pairwise_mode),
            &mut results,
        );

        let pd: f64 = paths.values().sum();
        calc_distinct(distinct, tree, nbr, pd, &mut results);

        let subtree = Subtree::for_labels(
            tree,
            nbr.labels_combined().keys().map(|s| s.as_str()),
        );
        // Labels missing from the tree are legitimate; reported, not fatal
        subtree.check_expected_count(nbr.labels_combined().len());

        let pe: f64 = weights.values().sum();
        calc_clade(
            tree,
            &subtree,
            &paths,
            pd,
            self.total_tree_length,
            &PD_CLADE,
            &mut results,
        );
        calc_clade(
            tree,
            &subtree,
            &weights,
            pe,
            self.total_tree_length,
            &PE_CLADE,
            &mut results,
        );

        Ok(results)
    }

    /// Builds the node range index on first use.
    fn ensure_ranges(&mut self) {
        if self.ranges.is_none() {
            self.ranges = Some(RangeIndex::build(self.tree.tree(), self.table));
        }
    }

    /// Builds the distinctiveness cache on first use.
    fn ensure_distinct(&mut self) {
        if self.distinct.is_none() {
            self.distinct = Some(DistinctCache::build(self.tree.tree(), self.table));
        }
    }
}
