//! Provides the tree representation consumed by the index engine.
//!
//! Provides [PhyloTree], a rooted phylogenetic tree using the arena pattern:
//! nodes are stored in a contiguous vector and referenced by [NodeIndex].
//! Aim is to avoid referencing troubles as well as to provide efficient
//! memory layout and cache locality for traversal operations.
//!
//! Unlike strictly bifurcating representations, [PhyloTree] allows any
//! number of children per node (polytomies are common in published trees),
//! and every node carries a name that is unique within the tree, since the
//! index engine addresses branches by name at its API edges.

use crate::model::node::{BranchLength, DEPTH_UNSET, NodeIndex, TreeNode};
use std::collections::HashMap;
use thiserror::Error;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: NodeIndex = usize::MAX;

/// Errors that can occur when constructing or finalizing a [PhyloTree].
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A node name was used twice; names are identity within a tree
    #[error("duplicate node name: {0}")]
    DuplicateName(String),
    /// A child index did not refer to an existing node
    #[error("unknown node index: {0}")]
    UnknownNode(NodeIndex),
    /// A child was attached to a second parent
    #[error("node {0} already has a parent")]
    ChildAlreadyAttached(NodeIndex),
    /// The root was requested or required but never set
    #[error("root has not been set")]
    RootNotSet,
    /// Finalization found nodes unreachable from the root
    #[error("{0} node(s) unreachable from the root")]
    UnreachableNodes(usize),
    /// An operation needing depths ran before [PhyloTree::finalize]
    #[error("tree has not been finalized")]
    NotFinalized,
    /// Trimming removed every terminal; tree and table share no taxa
    #[error("no terminals overlap the sample table")]
    NoOverlap,
}

// =#========================================================================#=
// PHYLO TREE
// =#========================================================================#=
/// A rooted phylogenetic tree represented using the arena pattern
/// on [TreeNode].
///
/// # Structure
/// - All nodes (root, internal, and terminals) are stored in the arena.
/// - Index of root is maintained.
/// - No assumption on order of indices is maintained.
/// - Node names are unique and resolvable via [`node_by_name`](Self::node_by_name).
/// - Branch lengths are optional, but if provided must be non-negative;
///   an absent length (typically the root) counts as zero.
///
/// # Construction
/// Add terminals and internal nodes one by one (bottom-up: children must
/// exist before their parent), mark the root with [`set_root`](Self::set_root),
/// then call [`finalize`](Self::finalize) to assign depths and check
/// structural invariants.
///
/// ```
/// use phylodiv::model::{BranchLength, PhyloTree};
///
/// let mut tree = PhyloTree::new();
/// let a = tree.add_terminal("A", Some(BranchLength::new(1.0))).unwrap();
/// let b = tree.add_terminal("B", Some(BranchLength::new(1.0))).unwrap();
/// let root = tree.add_internal("root", &[a, b], None).unwrap();
/// tree.set_root(root).unwrap();
/// tree.finalize().unwrap();
///
/// assert_eq!(tree.num_terminals(), 2);
/// assert_eq!(tree.total_length(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct PhyloTree {
    /// Nodes of this tree (arena pattern)
    nodes: Vec<TreeNode>,
    /// Index of the root of this tree
    root_index: NodeIndex,
    /// Map from node name to its arena index
    by_name: HashMap<String, NodeIndex>,
    /// Name of tree; optional
    name: Option<String>,
}

impl Default for PhyloTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new, empty tree.
    pub fn new() -> Self {
        PhyloTree {
            nodes: Vec::new(),
            root_index: NO_ROOT_SET_INDEX,
            by_name: HashMap::new(),
            name: None,
        }
    }

    /// Creates a new tree with capacity for `num_nodes` nodes.
    pub fn with_capacity(num_nodes: usize) -> Self {
        PhyloTree {
            nodes: Vec::with_capacity(num_nodes),
            root_index: NO_ROOT_SET_INDEX,
            by_name: HashMap::with_capacity(num_nodes),
            name: None,
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    /// Adds a terminal node, assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `name` - Name of the terminal (the taxon label); unique in the tree
    /// * `branch_length` - Length of incoming branch (non-negative)
    ///
    /// # Errors
    /// Returns [TreeError::DuplicateName] if `name` is already in use.
    pub fn add_terminal(
        &mut self,
        name: &str,
        branch_length: Option<BranchLength>,
    ) -> Result<NodeIndex, TreeError> {
        self.add_node(name, branch_length)
    }

    /// Adds an internal node with the given children, assigning a unique
    /// index, which gets returned. The children's parent links are set.
    ///
    /// # Arguments
    /// * `name` - Name of the node; unique in the tree
    /// * `children` - Indices of already-added child nodes
    /// * `branch_length` - Length of incoming branch (non-negative)
    ///
    /// # Errors
    /// Returns [TreeError::DuplicateName] if `name` is already in use,
    /// [TreeError::UnknownNode] if a child index is out of bounds, or
    /// [TreeError::ChildAlreadyAttached] if a child already has a parent.
    pub fn add_internal(
        &mut self,
        name: &str,
        children: &[NodeIndex],
        branch_length: Option<BranchLength>,
    ) -> Result<NodeIndex, TreeError> {
        for &child in children {
            if child >= self.nodes.len() {
                return Err(TreeError::UnknownNode(child));
            }
            if self.nodes[child].has_parent() {
                return Err(TreeError::ChildAlreadyAttached(child));
            }
        }

        let index = self.add_node(name, branch_length)?;
        for &child in children {
            self.nodes[child].set_parent(index);
            self.nodes[index].push_child(child);
        }

        Ok(index)
    }

    fn add_node(
        &mut self,
        name: &str,
        branch_length: Option<BranchLength>,
    ) -> Result<NodeIndex, TreeError> {
        if self.by_name.contains_key(name) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }

        let index = self.nodes.len();
        self.nodes
            .push(TreeNode::new(index, name.to_string(), branch_length));
        self.by_name.insert(name.to_string(), index);

        Ok(index)
    }

    /// Marks the node at `index` as the root of this tree.
    ///
    /// # Errors
    /// Returns [TreeError::UnknownNode] if `index` is out of bounds.
    pub fn set_root(&mut self, index: NodeIndex) -> Result<(), TreeError> {
        if index >= self.nodes.len() {
            return Err(TreeError::UnknownNode(index));
        }
        self.root_index = index;
        Ok(())
    }

    /// Assigns depths (edges from root) to all nodes and checks that every
    /// node is reachable from the root.
    ///
    /// Must be called once construction is complete; the index engine
    /// relies on depths for its bottom-up passes.
    ///
    /// # Errors
    /// Returns [TreeError::RootNotSet] if no root was marked, or
    /// [TreeError::UnreachableNodes] if some nodes hang outside the
    /// root's subtree.
    pub fn finalize(&mut self) -> Result<(), TreeError> {
        if !self.is_root_set() {
            return Err(TreeError::RootNotSet);
        }

        // Iterative pre-order walk assigning depth = parent depth + 1
        let mut visited = 0usize;
        let mut stack = vec![(self.root_index, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            self.nodes[index].set_depth(depth);
            visited += 1;
            for i in 0..self.nodes[index].num_children() {
                let child = self.nodes[index].children()[i];
                stack.push((child, depth + 1));
            }
        }

        if visited != self.nodes.len() {
            return Err(TreeError::UnreachableNodes(self.nodes.len() - visited));
        }

        Ok(())
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns whether [`finalize`](Self::finalize) has assigned depths.
    pub fn is_finalized(&self) -> bool {
        self.is_root_set() && self.root().depth() == 0
    }

    /// Returns a reference to the root node.
    ///
    /// # Panics
    /// Panics if the root hasn't been set and thus the tree hasn't been
    /// fully constructed yet.
    pub fn root(&self) -> &TreeNode {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> NodeIndex {
        self.root_index
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &TreeNode {
        &self[index]
    }

    /// Returns the index of the node with the given name, if present.
    pub fn node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    /// Returns `true` if a node with the given name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns the number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of terminal nodes in this tree.
    pub fn num_terminals(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_terminal()).count()
    }

    /// Returns an iterator over all terminal nodes.
    pub fn terminals(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|n| n.is_terminal())
    }

    /// Returns an iterator over all nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Returns the sum of all branch lengths in the tree.
    ///
    /// Nodes without a branch length (typically the root) contribute zero.
    pub fn total_length(&self) -> f64 {
        self.nodes.iter().map(|n| n.length()).sum()
    }

    /// Returns all node indices ordered by descending depth
    /// (deepest nodes first, root last).
    ///
    /// This is the processing order for the engine's bottom-up passes:
    /// every child appears before its parent.
    pub fn nodes_by_depth_desc(&self) -> Vec<NodeIndex> {
        let mut order: Vec<NodeIndex> = (0..self.nodes.len()).collect();
        order.sort_by(|&a, &b| self.nodes[b].depth().cmp(&self.nodes[a].depth()));
        order
    }
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl PhyloTree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is valid and the root has no parent
    /// - All node indices match their position in the arena
    /// - All child indices are valid and point back to the correct parent
    /// - All non-root nodes have a parent that includes them as a child
    /// - Depths have been assigned and are consistent with parent links
    /// - Node names are unique and resolvable
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        if self.root_index == NO_ROOT_SET_INDEX || self.root_index >= self.nodes.len() {
            return false;
        }

        if self.nodes[self.root_index].has_parent() {
            return false;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            // Check node index matches its arena position
            if node.index() != index {
                return false;
            }

            // Check name lookup round-trips
            if self.by_name.get(node.name()) != Some(&index) {
                return false;
            }

            // Check depth assignment
            if node.depth() == DEPTH_UNSET {
                return false;
            }

            // Check children references
            for &child in node.children() {
                if child >= self.nodes.len() {
                    return false;
                }
                if self.nodes[child].parent() != Some(index) {
                    return false;
                }
                if self.nodes[child].depth() != node.depth() + 1 {
                    return false;
                }
            }

            // Check parent references
            if index == self.root_index {
                continue;
            }
            match node.parent() {
                None => return false, // non-root without parent
                Some(parent_index) => {
                    if parent_index >= self.nodes.len() {
                        return false;
                    }
                    if !self.nodes[parent_index].children().contains(&index) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

impl std::ops::Index<NodeIndex> for PhyloTree {
    type Output = TreeNode;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.nodes[index]
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
impl PhyloTree {
    /// Returns an iterator over the tree in post-order (children before
    /// parents). Useful for aggregating data from terminals upward.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before
    /// children). Useful for propagating data from root to terminals.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Uses a stack-based approach to traverse the tree without recursion.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<(NodeIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.is_terminal() {
                return Some(node);
            }

            self.stack.push((index, true));
            // Push children in reverse, so the first child is processed first
            for &child in node.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// Uses a stack-based approach to traverse the tree without recursion.
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];

        for &child in node.children().iter().rev() {
            self.stack.push(child);
        }

        Some(node)
    }
}
