use std::collections::HashSet;

use tracing::instrument;

use super::{NodeIndex, ProgramTree, TreePath};

/// Depth-first, order-respecting walk over every occurrence of every node.
///
/// A node reachable through several parents is yielded once per path.
pub struct PathIterator<'a> {
    tree: &'a ProgramTree,
    stack: Vec<(TreePath, NodeIndex)>,
}

impl<'a> PathIterator<'a> {
    #[instrument(level = "trace", skip(tree))]
    pub(super) fn new(tree: &'a ProgramTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root_path(), tree.root())],
        }
    }
}

impl<'a> Iterator for PathIterator<'a> {
    type Item = (TreePath, NodeIndex);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, current) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for link in self.tree.node(current).children.iter().rev() {
            let child_id = self.tree.node(link.child).node_id;
            if !path.contains(child_id) {
                self.stack.push((path.join(child_id), link.child));
            }
        }
        Some((path, current))
    }
}

/// Depth-first walk yielding each distinct node once, starting node included.
pub struct NodeIterator<'a> {
    tree: &'a ProgramTree,
    stack: Vec<NodeIndex>,
    visited: HashSet<NodeIndex>,
}

impl<'a> NodeIterator<'a> {
    pub(super) fn new(tree: &'a ProgramTree, start: NodeIndex) -> Self {
        Self {
            tree,
            stack: vec![start],
            visited: HashSet::new(),
        }
    }
}

impl<'a> Iterator for NodeIterator<'a> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if !self.visited.insert(current) {
                continue;
            }
            for link in self.tree.node(current).children.iter().rev() {
                if !self.visited.contains(&link.child) {
                    self.stack.push(link.child);
                }
            }
            return Some(current);
        }
        None
    }
}
