//! Trimmed-tree derivation.
//!
//! An analysis only ever touches branches whose terminals occur in the
//! sample table, so the engine works on a tree restricted to those
//! branches. The trimmed tree is built once per tree + table pair and
//! cached for the lifetime of the run; when nothing needs trimming the
//! original tree is reused without a copy.

use crate::model::node::NodeIndex;
use crate::model::tree::{PhyloTree, TreeError};
use crate::sample::SampleTable;
use tracing::debug;

// =#========================================================================#=
// TRIMMED TREE
// =#========================================================================#=
/// A tree restricted to branches whose terminal labels exist in a
/// [SampleTable].
///
/// Either borrows the original tree (when every terminal is sampled) or
/// owns a reduced copy. Use [`tree()`](Self::tree) to access the
/// underlying [PhyloTree] either way.
#[derive(Debug)]
pub enum TrimmedTree<'a> {
    /// All terminals were present in the table; the original is reused
    Original(&'a PhyloTree),
    /// A reduced copy containing only sampled branches
    Reduced(PhyloTree),
}

impl TrimmedTree<'_> {
    /// Returns the underlying tree.
    pub fn tree(&self) -> &PhyloTree {
        match self {
            TrimmedTree::Original(tree) => tree,
            TrimmedTree::Reduced(tree) => tree,
        }
    }

    /// Returns `true` if trimming produced a reduced copy.
    pub fn is_reduced(&self) -> bool {
        matches!(self, TrimmedTree::Reduced(_))
    }
}

/// Derives the tree restricted to branches whose terminal labels exist in
/// the given table.
///
/// A node survives trimming if it is a sampled terminal or lies on the
/// root path of one. Surviving nodes keep their names, branch lengths and
/// relative order; depths are reassigned on the reduced copy.
///
/// # Errors
/// Returns [TreeError::NoOverlap] if no terminal of the tree occurs in
/// the table, and [TreeError::NotFinalized] if `tree` was never
/// finalized.
pub fn trim_to_table<'a>(
    tree: &'a PhyloTree,
    table: &SampleTable,
) -> Result<TrimmedTree<'a>, TreeError> {
    if !tree.is_finalized() {
        return Err(TreeError::NotFinalized);
    }

    // Mark every node on the root path of a sampled terminal, walking
    // parent links iteratively and stopping early at marked ancestors.
    let mut keep = vec![false; tree.num_nodes()];
    let mut num_sampled_terminals = 0usize;
    let mut num_terminals = 0usize;
    for terminal in tree.terminals() {
        num_terminals += 1;
        if !table.contains_label(terminal.name()) {
            continue;
        }
        num_sampled_terminals += 1;

        let mut current = terminal.index();
        loop {
            if keep[current] {
                break;
            }
            keep[current] = true;
            match tree[current].parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
    }

    if num_sampled_terminals == 0 {
        return Err(TreeError::NoOverlap);
    }
    if num_sampled_terminals == num_terminals {
        return Ok(TrimmedTree::Original(tree));
    }

    debug!(
        kept = num_sampled_terminals,
        dropped = num_terminals - num_sampled_terminals,
        "trimming tree to sampled terminals"
    );

    // Rebuild bottom-up; post-order guarantees children exist before
    // their parent is added.
    let mut reduced = PhyloTree::with_capacity(keep.iter().filter(|&&k| k).count());
    let mut remap: Vec<Option<NodeIndex>> = vec![None; tree.num_nodes()];
    for node in tree.post_order_iter() {
        if !keep[node.index()] {
            continue;
        }

        let kept_children: Vec<NodeIndex> = node
            .children()
            .iter()
            .filter_map(|&c| remap[c])
            .collect();

        let new_index = if kept_children.is_empty() {
            reduced.add_terminal(node.name(), node.branch_length())?
        } else {
            reduced.add_internal(node.name(), &kept_children, node.branch_length())?
        };
        remap[node.index()] = Some(new_index);
    }

    // The original root is on every kept path, so it is always remapped.
    let new_root = remap[tree.root_index()].ok_or(TreeError::RootNotSet)?;
    reduced.set_root(new_root)?;
    reduced.finalize()?;

    Ok(TrimmedTree::Reduced(reduced))
}
