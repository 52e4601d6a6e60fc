//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use phylodiv::model::{BranchLength, NodeIndex, PhyloTree};
use phylodiv::sample::SampleTable;
use rand::prelude::*;

/// Balanced four-taxon tree with unit branch lengths and a zero-length
/// root: ((A,B)ab,(C,D)cd)root. Total length 6.
pub fn balanced_four_taxon_tree() -> PhyloTree {
    let mut tree = PhyloTree::new();
    let a = tree.add_terminal("A", Some(BranchLength::new(1.0))).unwrap();
    let b = tree.add_terminal("B", Some(BranchLength::new(1.0))).unwrap();
    let c = tree.add_terminal("C", Some(BranchLength::new(1.0))).unwrap();
    let d = tree.add_terminal("D", Some(BranchLength::new(1.0))).unwrap();
    let ab = tree
        .add_internal("ab", &[a, b], Some(BranchLength::new(1.0)))
        .unwrap();
    let cd = tree
        .add_internal("cd", &[c, d], Some(BranchLength::new(1.0)))
        .unwrap();
    let root = tree.add_internal("root", &[ab, cd], None).unwrap();
    tree.set_root(root).unwrap();
    tree.finalize().unwrap();
    tree
}

/// Two groups covering the four taxa: group1 = {A, B}, group2 = {C, D},
/// one individual each.
pub fn two_group_table() -> SampleTable {
    let mut table = SampleTable::new();
    table.add_sample("group1", "A", 1.0);
    table.add_sample("group1", "B", 1.0);
    table.add_sample("group2", "C", 1.0);
    table.add_sample("group2", "D", 1.0);
    table
}

/// Random binary tree over `num_taxa` terminals (t0..tN) built by
/// repeatedly joining two random roots, plus a table scattering the taxa
/// over `num_groups` groups (g0..gM, each guaranteed non-empty).
pub fn random_tree_and_table(
    rng: &mut StdRng,
    num_taxa: usize,
    num_groups: usize,
) -> (PhyloTree, SampleTable) {
    let mut tree = PhyloTree::new();
    let mut roots: Vec<NodeIndex> = (0..num_taxa)
        .map(|i| {
            tree.add_terminal(
                &format!("t{}", i),
                Some(BranchLength::new(rng.random_range(0.1..2.0))),
            )
            .unwrap()
        })
        .collect();

    let mut joined = 0usize;
    while roots.len() > 1 {
        let first = roots.swap_remove(rng.random_range(0..roots.len()));
        let second = roots.swap_remove(rng.random_range(0..roots.len()));
        let branch_length = if roots.is_empty() {
            None // this join is the root
        } else {
            Some(BranchLength::new(rng.random_range(0.1..2.0)))
        };
        let node = tree
            .add_internal(&format!("n{}", joined), &[first, second], branch_length)
            .unwrap();
        joined += 1;
        roots.push(node);
    }
    tree.set_root(roots[0]).unwrap();
    tree.finalize().unwrap();

    let mut table = SampleTable::new();
    for g in 0..num_groups {
        let group = format!("g{}", g);
        for t in 0..num_taxa {
            if rng.random_bool(0.4) {
                table.add_sample(&group, &format!("t{}", t), rng.random_range(1..5) as f64);
            }
        }
        if !table.groups().contains(&group) {
            let t = rng.random_range(0..num_taxa);
            table.add_sample(&group, &format!("t{}", t), 1.0);
        }
    }

    (tree, table)
}

pub const EPSILON: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}
