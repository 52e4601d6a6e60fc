mod common;

use common::balanced_four_taxon_tree;
use phylodiv::model::{BranchLength, PhyloTree, TreeError, trim_to_table};
use phylodiv::sample::SampleTable;

#[test]
fn test_building_tree() {
    let mut tree = PhyloTree::new();
    let kaki = tree
        .add_terminal("Himantopus novaezelandiae", Some(BranchLength::new(1.0)))
        .unwrap();
    let pied = tree
        .add_terminal("Himantopus leucocephalus", Some(BranchLength::new(1.0)))
        .unwrap();
    let wrybill = tree
        .add_terminal("Anarhynchus frontalis", Some(BranchLength::new(0.5)))
        .unwrap();
    let stilts = tree
        .add_internal("stilts", &[kaki, pied], Some(BranchLength::new(1.5)))
        .unwrap();
    let root = tree.add_internal("root", &[wrybill, stilts], None).unwrap();
    tree.set_root(root).unwrap();
    tree.finalize().unwrap();

    // Counts
    assert_eq!(tree.num_terminals(), 3);
    assert_eq!(tree.num_nodes(), 5);

    // Root
    assert_eq!(tree.root().index(), root);
    assert!(tree.root().parent().is_none());

    // Terminal
    let node = &tree[pied];
    assert!(node.is_terminal());
    assert_eq!(node.name(), "Himantopus leucocephalus");
    assert_eq!(node.depth(), 2);

    // Internal
    let node = &tree[stilts];
    assert!(node.is_internal());
    assert_eq!(node.children(), &[kaki, pied]);
    assert_eq!(node.length(), 1.5);

    // Lookup and lengths
    assert_eq!(tree.node_by_name("stilts"), Some(stilts));
    assert_eq!(tree.node_by_name("moa"), None);
    assert_eq!(tree.total_length(), 5.0);
    assert!(tree.is_valid());
}

#[test]
fn test_duplicate_names_are_rejected() {
    let mut tree = PhyloTree::new();
    tree.add_terminal("Nestor notabilis", None).unwrap();
    let result = tree.add_terminal("Nestor notabilis", None);
    assert_eq!(
        result,
        Err(TreeError::DuplicateName("Nestor notabilis".to_string()))
    );
}

#[test]
fn test_finalize_requires_root() {
    let mut tree = PhyloTree::new();
    tree.add_terminal("A", None).unwrap();
    assert_eq!(tree.finalize(), Err(TreeError::RootNotSet));
}

#[test]
fn test_finalize_rejects_unreachable_nodes() {
    let mut tree = PhyloTree::new();
    let a = tree.add_terminal("A", None).unwrap();
    let b = tree.add_terminal("B", None).unwrap();
    let root = tree.add_internal("root", &[a, b], None).unwrap();
    tree.add_terminal("orphan", None).unwrap();
    tree.set_root(root).unwrap();
    assert_eq!(tree.finalize(), Err(TreeError::UnreachableNodes(1)));
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = PhyloTree::new();
    tree.root(); // Should panic
}

#[test]
fn test_post_order_visits_children_first() {
    let tree = balanced_four_taxon_tree();
    let names: Vec<&str> = tree.post_order_iter().map(|n| n.name()).collect();
    assert_eq!(names, ["A", "B", "ab", "C", "D", "cd", "root"]);
}

#[test]
fn test_pre_order_visits_parents_first() {
    let tree = balanced_four_taxon_tree();
    let names: Vec<&str> = tree.pre_order_iter().map(|n| n.name()).collect();
    assert_eq!(names, ["root", "ab", "A", "B", "cd", "C", "D"]);
}

#[test]
fn test_depth_descending_order_puts_children_before_parents() {
    let tree = balanced_four_taxon_tree();
    let order = tree.nodes_by_depth_desc();
    let position = |name: &str| {
        order
            .iter()
            .position(|&i| tree[i].name() == name)
            .unwrap()
    };
    assert!(position("A") < position("ab"));
    assert!(position("ab") < position("root"));
    assert!(position("cd") < position("root"));
}

#[test]
fn test_trim_reuses_tree_when_all_terminals_sampled() {
    let tree = balanced_four_taxon_tree();
    let table = common::two_group_table();
    let trimmed = trim_to_table(&tree, &table).unwrap();
    assert!(!trimmed.is_reduced());
    assert_eq!(trimmed.tree().num_nodes(), tree.num_nodes());
}

#[test]
fn test_trim_drops_unsampled_branches() {
    let tree = balanced_four_taxon_tree();
    let mut table = SampleTable::new();
    table.add_sample("group1", "A", 1.0);
    table.add_sample("group1", "B", 1.0);

    let trimmed = trim_to_table(&tree, &table).unwrap();
    assert!(trimmed.is_reduced());

    let reduced = trimmed.tree();
    assert!(reduced.is_valid());
    assert_eq!(reduced.num_terminals(), 2);
    assert!(reduced.contains_name("A"));
    assert!(reduced.contains_name("ab"));
    assert!(reduced.contains_name("root"));
    assert!(!reduced.contains_name("C"));
    assert!(!reduced.contains_name("cd"));
    // A + B + ab survive with their lengths
    assert_eq!(reduced.total_length(), 3.0);
}

#[test]
fn test_trim_with_no_overlap_is_an_error() {
    let tree = balanced_four_taxon_tree();
    let mut table = SampleTable::new();
    table.add_sample("group1", "Strigops habroptilus", 1.0);

    assert_eq!(
        trim_to_table(&tree, &table).err(),
        Some(TreeError::NoOverlap)
    );
}
