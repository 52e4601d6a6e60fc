//! Data model for rooted phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [PhyloTree], which uses the arena pattern to
//! store [TreeNode] values referenced by [NodeIndex]. Nodes are named,
//! carry optional non-negative branch lengths, and may have any number of
//! children.
//!
//! # Trimming
//! Analyses operate on a tree restricted to sampled taxa; see
//! [trim_to_table] and [TrimmedTree].

pub mod node;
pub mod tree;
pub mod trim;

pub use node::BranchLength;
pub use node::NodeIndex;
pub use node::TreeNode;
pub use tree::PhyloTree;
pub use tree::TreeError;
pub use trim::TrimmedTree;
pub use trim::trim_to_table;
