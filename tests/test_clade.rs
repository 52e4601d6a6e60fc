mod common;

use common::{assert_close, balanced_four_taxon_tree, random_tree_and_table, two_group_table};
use phylodiv::calc::CalcContext;
use rand::prelude::*;
use std::collections::HashMap;

fn node_map<'a>(
    results: &'a phylodiv::calc::CalcResults,
    name: &str,
) -> &'a HashMap<String, f64> {
    results
        .get(name)
        .and_then(|v| v.as_node_map())
        .unwrap_or_else(|| panic!("{name} missing or not a node map"))
}

#[test]
fn test_clade_scores_accumulate_bottom_up() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    let scores = node_map(&results, "PD_CLADE_SCORE");
    assert_close(scores["A"], 1.0);
    assert_close(scores["ab"], 3.0); // own branch + A + B
    assert_close(scores["root"], 6.0); // the whole sampled tree

    let contr = node_map(&results, "PD_CLADE_CONTR");
    assert_close(contr["root"], 1.0);
    // Sibling clades partition the root's share
    assert_close(contr["ab"] + contr["cd"], 1.0);
}

#[test]
fn test_clade_contributions_of_terminal_partition_sum_to_pd() {
    let mut rng = StdRng::seed_from_u64(5);
    let (tree, table) = random_tree_and_table(&mut rng, 16, 4);
    let mut context = CalcContext::builder(&tree, &table).build().unwrap();

    let pair = context.neighbour_sets(&["g0", "g1"], &["g2", "g3"]).unwrap();
    let results = context.calc_pair(&pair).unwrap();

    let pd = results.scalar("PD").unwrap();
    let scores = node_map(&results, "PD_CLADE_SCORE");

    // Terminal clade scores plus internal own-weights partition PD; the
    // root's clade score must equal it exactly
    let root_name = context.tree().root().name();
    assert!((scores[root_name] - pd).abs() < 1e-9);

    let contr = node_map(&results, "PD_CLADE_CONTR");
    assert!((contr[root_name] - 1.0).abs() < 1e-10);
}

#[test]
fn test_root_clade_loss_is_zero() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    let loss = node_map(&results, "PD_CLADE_LOSS_SCORE");
    assert_close(loss["root"], 0.0);

    // Siblings with sampled counterparts lose exactly themselves
    assert_close(loss["A"], 1.0);
    assert_close(loss["ab"], 3.0);
}

#[test]
fn test_loss_walks_collapse_single_child_chains() {
    let tree = balanced_four_taxon_tree();

    // Only A and C sampled: ab and cd each have a single sampled child
    let mut table = phylodiv::sample::SampleTable::new();
    table.add_sample("gA", "A", 1.0);
    table.add_sample("gC", "C", 1.0);
    let mut context = CalcContext::builder(&tree, &table).build().unwrap();

    let pair = context.neighbour_sets(&["gA"], &["gC"]).unwrap();
    let results = context.calc_pair(&pair).unwrap();

    // Pruning A also kills the ab branch: both collapse at ab
    let loss = node_map(&results, "PD_CLADE_LOSS_SCORE");
    assert_close(loss["A"], 2.0);
    assert_close(loss["ab"], 2.0);
    assert_close(loss["root"], 0.0);

    // Ancestral share: of A's loss of 2, half sits above A itself
    let anc = node_map(&results, "PD_CLADE_LOSS_ANC");
    assert_close(anc["A"], 1.0);
    assert_close(anc["ab"], 0.0);
    let anc_p = node_map(&results, "PD_CLADE_LOSS_ANC_P");
    assert_close(anc_p["A"], 0.5);
}

#[test]
fn test_single_chain_sample_loses_nothing_measurable() {
    let tree = balanced_four_taxon_tree();
    let mut table = phylodiv::sample::SampleTable::new();
    table.add_sample("gA", "A", 1.0);

    let results = phylodiv::calculate_pair(&tree, &table, &["gA"], &["gA"]).unwrap();

    // The whole sample is one chain A..root; pruning anywhere removes
    // the entire sampled tree, so no residual score remains
    let loss = node_map(&results, "PD_CLADE_LOSS_SCORE");
    assert_close(loss["A"], 0.0);
    assert_close(loss["ab"], 0.0);
    assert_close(loss["root"], 0.0);
}

#[test]
fn test_pe_clade_scores_follow_endemism_weights() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group1"]).unwrap();

    // Sample covers group1 only; every sampled branch is endemic to it
    let pe = results.scalar("PE_WE").unwrap();
    let scores = node_map(&results, "PE_CLADE_SCORE");
    assert_close(scores["root"], pe);

    let contr = node_map(&results, "PE_CLADE_CONTR");
    assert_close(contr["root"], 1.0);
}
