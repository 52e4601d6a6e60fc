mod common;

use common::{assert_close, balanced_four_taxon_tree, random_tree_and_table, two_group_table};
use phylodiv::calc::CalcContext;
use phylodiv::model::{BranchLength, PhyloTree};
use phylodiv::sample::SampleTable;
use rand::prelude::*;

#[test]
fn test_pd_of_both_groups_spans_the_whole_tree() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    assert_close(results.scalar("PD").unwrap(), 6.0);
    assert_close(results.scalar("PD_P").unwrap(), 1.0);
    // Four taxa
    assert_close(results.scalar("PD_PER_TAXON").unwrap(), 1.5);
}

#[test]
fn test_pd_of_one_group_spans_its_clade() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group1"]).unwrap();

    // A + B + ab branches; the root carries no length
    assert_close(results.scalar("PD").unwrap(), 3.0);
    assert_close(results.scalar("PD_P").unwrap(), 0.5);
}

#[test]
fn test_pd_p_stays_in_unit_interval_on_random_pairs() {
    let mut rng = StdRng::seed_from_u64(7);
    let (tree, table) = random_tree_and_table(&mut rng, 20, 6);
    let mut context = CalcContext::builder(&tree, &table).build().unwrap();

    for _ in 0..20 {
        let g1 = format!("g{}", rng.random_range(0..table.num_groups()));
        let g2 = format!("g{}", rng.random_range(0..table.num_groups()));
        let pair = context
            .neighbour_sets(&[g1.as_str()], &[g2.as_str()])
            .unwrap();
        let results = context.calc_pair(&pair).unwrap();

        let pd_p = results.scalar("PD_P").unwrap();
        assert!((0.0..=1.0).contains(&pd_p), "PD_P out of range: {pd_p}");

        // PD_PER_TAXON = PD / richness by definition
        let pd = results.scalar("PD").unwrap();
        let richness = pair
            .labels_combined()
            .keys()
            .filter(|label| tree.contains_name(label.as_str()))
            .count();
        assert_close(results.scalar("PD_PER_TAXON").unwrap(), pd / richness as f64);
    }
}

#[test]
fn test_pe_equals_pd_when_the_sample_covers_every_group() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    // Both groups sampled: every branch has local range == global range
    assert_close(results.scalar("PE_WE").unwrap(), 6.0);
    assert_close(results.scalar("PE_WE_P").unwrap(), 1.0);
    assert_close(results.scalar("PD_ENDEMISM").unwrap(), 6.0);
}

#[test]
fn test_pe_downweights_widespread_branches() {
    let tree = balanced_four_taxon_tree();
    let mut table = two_group_table();
    // B also occurs in group2, widening the ranges of B and ab
    table.add_sample("group2", "B", 1.0);

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group1"]).unwrap();

    // Weights: A 1*(1/1), B 1*(1/2), ab 1*(1/2), root 0
    assert_close(results.scalar("PE_WE").unwrap(), 2.0);
    // Only A is endemic to the sampled neighbourhood
    assert_close(results.scalar("PD_ENDEMISM").unwrap(), 1.0);
    // The single variant drops the local numerator
    assert_close(results.scalar("PE_WE_SINGLE").unwrap(), 2.0);
}

#[test]
fn test_pe_central_restricts_to_the_first_set() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    // Branches reachable from set 1 only: A, B, ab (and the weightless
    // root), with combined local ranges
    assert_close(results.scalar("PE_CENTRAL").unwrap(), 3.0);
    assert_close(results.scalar("PE_CENTRAL_P").unwrap(), 0.5);
}

#[test]
fn test_undefined_ratios_for_empty_richness() {
    let tree = balanced_four_taxon_tree();
    let mut table = two_group_table();
    // A group whose only taxon is off-tree
    table.add_sample("ghost", "Aves ghost", 1.0);

    let results = phylodiv::calculate_pair(&tree, &table, &["ghost"], &["ghost"]).unwrap();

    assert_close(results.scalar("PD").unwrap(), 0.0);
    assert!(results.is_undefined("PD_PER_TAXON"));
}

#[test]
fn test_aed_t_weights_sample_abundance() {
    // Terminal X: branch 5, global abundance 10 (4 in g1 + 6 in g2)
    let mut tree = PhyloTree::new();
    let x = tree.add_terminal("X", Some(BranchLength::new(5.0))).unwrap();
    let y = tree
        .add_terminal("Y", Some(BranchLength::new(45.0)))
        .unwrap();
    let root = tree.add_internal("root", &[x, y], None).unwrap();
    tree.set_root(root).unwrap();
    tree.finalize().unwrap();

    let mut table = SampleTable::new();
    table.add_sample("g1", "X", 4.0);
    table.add_sample("g2", "X", 6.0);
    table.add_sample("g2", "Y", 1.0);

    let results = phylodiv::calculate_pair(&tree, &table, &["g1"], &["g1"]).unwrap();

    // AED(X) = 5/10; its AED_T contribution = 0.5 x 4 sampled
    let aed_list = results.get("PHYLO_AED_LIST").unwrap().as_node_map().unwrap();
    assert_close(aed_list["X"], 0.5);
    assert_close(results.scalar("PHYLO_AED_T").unwrap(), 2.0);
}

#[test]
fn test_ed_fair_proportion_partitions_the_tree() {
    let tree = balanced_four_taxon_tree();
    let table = two_group_table();

    let results = phylodiv::calculate_pair(&tree, &table, &["group1"], &["group2"]).unwrap();

    let ed_list = results.get("PHYLO_ED_LIST").unwrap().as_node_map().unwrap();
    // Each terminal: own branch + half the parent branch
    assert_close(ed_list["A"], 1.5);
    // Fair proportions over all terminals sum to the total tree length
    let total: f64 = ed_list.values().sum();
    assert_close(total, tree.total_length());

    let es_list = results.get("PHYLO_ES_LIST").unwrap().as_node_map().unwrap();
    assert_close(es_list["A"], 1.5);

    // Unit abundances everywhere make AED match ED here
    let aed_list = results.get("PHYLO_AED_LIST").unwrap().as_node_map().unwrap();
    assert_close(aed_list["A"], 1.5);
    assert_close(results.scalar("PHYLO_AED_T").unwrap(), 6.0);
    assert_close(results.scalar("PHYLO_AED_T_WTD_P").unwrap(), 1.0);
}
