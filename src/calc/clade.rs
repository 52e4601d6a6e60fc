//! Clade contribution and loss engine.
//!
//! Given a per-node weight map (branch lengths for PD, endemism weights
//! for PE) and its total, computes for every node of the induced subtree
//! its clade score (own weight plus everything beneath it), its share of
//! the total, and how much of the total would disappear if the clade
//! were pruned from the sample.

use crate::calc::result::CalcResults;
use crate::calc::subtree::Subtree;
use crate::model::node::NodeIndex;
use crate::model::tree::PhyloTree;
use std::collections::HashMap;

/// Contributions are rounded to this many significant decimal digits to
/// keep floating noise out of otherwise-equal shares.
const CONTRIBUTION_DIGITS: i32 = 11;

/// The result names one clade pass writes; PD and PE passes differ only
/// in these.
pub struct CladeIndexNames {
    pub score: &'static str,
    pub contr: &'static str,
    pub contr_p: &'static str,
    pub loss_score: &'static str,
    pub loss_contr: &'static str,
    pub loss_contr_p: &'static str,
    pub loss_anc: &'static str,
    pub loss_anc_p: &'static str,
}

/// Names for the PD-weighted clade pass.
pub const PD_CLADE: CladeIndexNames = CladeIndexNames {
    score: "PD_CLADE_SCORE",
    contr: "PD_CLADE_CONTR",
    contr_p: "PD_CLADE_CONTR_P",
    loss_score: "PD_CLADE_LOSS_SCORE",
    loss_contr: "PD_CLADE_LOSS_CONTR",
    loss_contr_p: "PD_CLADE_LOSS_CONTR_P",
    loss_anc: "PD_CLADE_LOSS_ANC",
    loss_anc_p: "PD_CLADE_LOSS_ANC_P",
};

/// Names for the PE-weighted clade pass.
pub const PE_CLADE: CladeIndexNames = CladeIndexNames {
    score: "PE_CLADE_SCORE",
    contr: "PE_CLADE_CONTR",
    contr_p: "PE_CLADE_CONTR_P",
    loss_score: "PE_CLADE_LOSS_SCORE",
    loss_contr: "PE_CLADE_LOSS_CONTR",
    loss_contr_p: "PE_CLADE_LOSS_CONTR_P",
    loss_anc: "PE_CLADE_LOSS_ANC",
    loss_anc_p: "PE_CLADE_LOSS_ANC_P",
};

/// Computes clade scores, contributions and losses over `subtree` and
/// writes them under `names`.
///
/// Nodes are processed in descending depth order, so children are always
/// scored before their parents; no recursion. Contributions are shares
/// of `total_score`, contribution-P shares of `total_tree_length`; both
/// are rounded to 11 significant digits and reported as undefined when
/// their denominator is zero.
pub fn calc_clade(
    tree: &PhyloTree,
    subtree: &Subtree,
    weights: &HashMap<NodeIndex, f64>,
    total_score: f64,
    total_tree_length: f64,
    names: &CladeIndexNames,
    results: &mut CalcResults,
) {
    let order = subtree.nodes_by_depth_desc(tree);

    // Clade score = own weight + already-scored children
    let mut scores: HashMap<NodeIndex, f64> = HashMap::with_capacity(order.len());
    for &node in &order {
        let mut score = weights.get(&node).copied().unwrap_or(0.0);
        for &child in subtree.children_of(node) {
            score += scores[&child];
        }
        scores.insert(node, score);
    }

    let losses = clade_losses(subtree, &order, &scores);

    let mut score_map = HashMap::with_capacity(order.len());
    let mut contr_map = HashMap::with_capacity(order.len());
    let mut contr_p_map = HashMap::with_capacity(order.len());
    let mut loss_map = HashMap::with_capacity(order.len());
    let mut loss_contr_map = HashMap::with_capacity(order.len());
    let mut loss_contr_p_map = HashMap::with_capacity(order.len());
    let mut anc_map = HashMap::with_capacity(order.len());
    let mut anc_p_map = HashMap::with_capacity(order.len());

    for &node in &order {
        let name = tree[node].name();
        let score = scores[&node];
        let loss = losses[&node];

        score_map.insert(name.to_string(), score);
        loss_map.insert(name.to_string(), loss);
        if total_score != 0.0 {
            contr_map.insert(name.to_string(), round_sig(score / total_score));
            loss_contr_map.insert(name.to_string(), round_sig(loss / total_score));
        }
        if total_tree_length != 0.0 {
            contr_p_map.insert(name.to_string(), round_sig(score / total_tree_length));
            loss_contr_p_map.insert(name.to_string(), round_sig(loss / total_tree_length));
        }

        // Loss attributable to branches strictly above the clade itself
        let (anc, anc_p) = if loss == 0.0 {
            (0.0, 0.0)
        } else {
            let anc = loss - score;
            (anc, anc / loss)
        };
        anc_map.insert(name.to_string(), anc);
        anc_p_map.insert(name.to_string(), anc_p);
    }

    results.insert_node_map(names.score, score_map);
    results.insert_node_map(names.loss_score, loss_map);
    results.insert_node_map(names.loss_anc, anc_map);
    results.insert_node_map(names.loss_anc_p, anc_p_map);
    if total_score != 0.0 {
        results.insert_node_map(names.contr, contr_map);
        results.insert_node_map(names.loss_contr, loss_contr_map);
    } else {
        results.insert_undefined(names.contr);
        results.insert_undefined(names.loss_contr);
    }
    if total_tree_length != 0.0 {
        results.insert_node_map(names.contr_p, contr_p_map);
        results.insert_node_map(names.loss_contr_p, loss_contr_p_map);
    } else {
        results.insert_undefined(names.contr_p);
        results.insert_undefined(names.loss_contr_p);
    }
}

/// Computes the loss score per subtree node.
///
/// Pruning a clade also kills every ancestor branch left with no other
/// sampled descendants: the walk climbs while the parent has exactly one
/// sampled child, and the node where that stops is the removal point.
/// Every node on the walk shares the removal point's clade score as its
/// loss. A walk that reaches the subtree root - including starting
/// there - yields zero: pruning removes the entire sampled tree and no
/// score remains to measure against.
fn clade_losses(
    subtree: &Subtree,
    order: &[NodeIndex],
    scores: &HashMap<NodeIndex, f64>,
) -> HashMap<NodeIndex, f64> {
    let mut losses: HashMap<NodeIndex, f64> = HashMap::with_capacity(order.len());

    for &node in order {
        if losses.contains_key(&node) {
            continue;
        }

        let mut chain = vec![node];
        let mut current = node;
        let loss = loop {
            match subtree.parent_of(current) {
                None => break 0.0,
                Some(parent) => {
                    if subtree.children_of(parent).len() == 1 {
                        if let Some(&known) = losses.get(&parent) {
                            // Joined an already-resolved run
                            break known;
                        }
                        chain.push(parent);
                        current = parent;
                    } else {
                        break scores[&current];
                    }
                }
            }
        };

        for resolved in chain {
            losses.insert(resolved, loss);
        }
    }

    losses
}

/// Rounds to [CONTRIBUTION_DIGITS] significant decimal digits.
fn round_sig(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(CONTRIBUTION_DIGITS - 1 - magnitude);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_sig_trims_float_noise() {
        assert_eq!(round_sig(0.1 + 0.2), 0.3);
        assert_eq!(round_sig(1.0), 1.0);
        assert_eq!(round_sig(0.0), 0.0);
    }
}
