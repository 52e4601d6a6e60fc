//! Evolutionary distinctiveness: ED, ES and AED per terminal.
//!
//! All three walk from a terminal to the root accumulating branch length
//! under different weightings:
//! - ED ("fair proportion"): each branch split equally over the terminals
//!   beneath it,
//! - ES ("equal splits"): the walker's weight divided by the child count
//!   at each ancestor,
//! - AED: each branch split over the global abundance beneath it.
//!
//! The per-terminal scores depend only on the tree and the table, so they
//! are computed once per run and cached; per-pair calculation just reads
//! them out for the sampled labels.

use crate::calc::diversity::ratio;
use crate::calc::result::CalcResults;
use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use crate::sample::basedata::SampleTable;
use crate::sample::neighbours::NeighbourSets;
use std::collections::HashMap;
use tracing::debug;

// =#========================================================================#=
// DISTINCTNESS CACHE
// =#========================================================================#=
/// Per-terminal ED/ES/AED scores over one tree, plus the per-node
/// accumulations they are derived from.
#[derive(Debug)]
pub struct DistinctCache {
    /// Per node, number of terminals in its clade
    terminals_under: Vec<usize>,
    /// Per node, summed global abundance of the terminals in its clade
    abundance_under: Vec<f64>,
    /// Per terminal, the three distinctiveness scores
    ed: HashMap<NodeIndex, f64>,
    es: HashMap<NodeIndex, f64>,
    aed: HashMap<NodeIndex, f64>,
}

impl DistinctCache {
    /// Builds the distinctiveness scores for `tree` against `table`.
    ///
    /// One post-order pass accumulates terminal counts and abundances
    /// bottom-up; one rootward walk per terminal then derives the scores.
    pub fn build(tree: &PhyloTree, table: &SampleTable) -> Self {
        let mut terminals_under = vec![0usize; tree.num_nodes()];
        let mut abundance_under = vec![0.0f64; tree.num_nodes()];

        for node in tree.post_order_iter() {
            let index = node.index();
            if node.is_terminal() {
                terminals_under[index] = 1;
                abundance_under[index] = table.global_abundance(node.name());
                continue;
            }
            for &child in node.children() {
                terminals_under[index] += terminals_under[child];
                abundance_under[index] += abundance_under[child];
            }
        }

        let mut cache = DistinctCache {
            terminals_under,
            abundance_under,
            ed: HashMap::new(),
            es: HashMap::new(),
            aed: HashMap::new(),
        };

        for terminal in tree.terminals() {
            let index = terminal.index();
            let ed = cache.ed_walk(tree, index);
            let es = cache.es_walk(tree, index);
            let aed = cache.aed_walk(tree, index);
            cache.ed.insert(index, ed);
            cache.es.insert(index, es);
            cache.aed.insert(index, aed);
        }

        debug!(terminals = cache.ed.len(), "built distinctiveness cache");
        cache
    }

    /// Fair proportion: each branch divided by the terminals beneath it.
    fn ed_walk(&self, tree: &PhyloTree, terminal: NodeIndex) -> f64 {
        let mut score = 0.0;
        let mut current = terminal;
        loop {
            score += tree[current].length() / self.terminals_under[current] as f64;
            match tree[current].parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        score
    }

    /// Equal splits: the weight shrinks by the child count at each
    /// ancestor on the way up.
    fn es_walk(&self, tree: &PhyloTree, terminal: NodeIndex) -> f64 {
        let mut score = 0.0;
        let mut weight = 1.0;
        let mut current = terminal;
        loop {
            score += tree[current].length() * weight;
            match tree[current].parent() {
                Some(parent) => {
                    weight /= tree[parent].num_children() as f64;
                    current = parent;
                }
                None => break,
            }
        }
        score
    }

    /// Abundance weighting: each branch divided by the global abundance
    /// beneath it. Branches with zero recorded abundance are skipped.
    fn aed_walk(&self, tree: &PhyloTree, terminal: NodeIndex) -> f64 {
        let mut score = 0.0;
        let mut current = terminal;
        loop {
            if self.abundance_under[current] > 0.0 {
                score += tree[current].length() / self.abundance_under[current];
            }
            match tree[current].parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        score
    }

    /// Returns the ED score of a terminal.
    pub fn ed(&self, terminal: NodeIndex) -> Option<f64> {
        self.ed.get(&terminal).copied()
    }

    /// Returns the ES score of a terminal.
    pub fn es(&self, terminal: NodeIndex) -> Option<f64> {
        self.es.get(&terminal).copied()
    }

    /// Returns the AED score of a terminal.
    pub fn aed(&self, terminal: NodeIndex) -> Option<f64> {
        self.aed.get(&terminal).copied()
    }
}

/// Writes the distinctiveness results for one pair: the per-terminal
/// lists (`PHYLO_ED_LIST`, `PHYLO_ES_LIST`, `PHYLO_AED_LIST`) restricted
/// to the pair's labels, the abundance-weighted total `PHYLO_AED_T`, and
/// `PHYLO_AED_T_WTD_P`, its proportion of the pair's PD.
pub fn calc_distinct(
    cache: &DistinctCache,
    tree: &PhyloTree,
    nbr: &NeighbourSets,
    pd: f64,
    results: &mut CalcResults,
) {
    let mut ed_list = HashMap::new();
    let mut es_list = HashMap::new();
    let mut aed_list = HashMap::new();
    let mut aed_t = 0.0;

    for (label, &abundance) in nbr.labels_combined() {
        let Some(node) = tree.node_by_name(label) else {
            continue;
        };
        let (Some(ed), Some(es), Some(aed)) = (cache.ed(node), cache.es(node), cache.aed(node))
        else {
            continue;
        };
        ed_list.insert(label.clone(), ed);
        es_list.insert(label.clone(), es);
        aed_list.insert(label.clone(), aed);
        aed_t += aed * abundance;
    }

    results.insert_node_map("PHYLO_ED_LIST", ed_list);
    results.insert_node_map("PHYLO_ES_LIST", es_list);
    results.insert_node_map("PHYLO_AED_LIST", aed_list);
    results.insert_scalar("PHYLO_AED_T", aed_t);
    results.insert_optional("PHYLO_AED_T_WTD_P", ratio(aed_t, pd));
}
