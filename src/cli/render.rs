//! Text rendering of program trees

use termtree::Tree;

use crate::domain::{Link, NodeIndex, ProgramTree};

/// One line per path: a node shared by several parents shows under each of them.
pub fn render_tree(tree: &ProgramTree) -> Tree<String> {
    render_node(tree, tree.root(), None)
}

fn render_node(tree: &ProgramTree, index: NodeIndex, link: Option<&Link>) -> Tree<String> {
    let leaves: Vec<Tree<String>> = tree
        .node(index)
        .children
        .iter()
        .map(|child| render_node(tree, child.child, Some(child)))
        .collect();
    Tree::new(label(tree, index, link)).with_leaves(leaves)
}

fn label(tree: &ProgramTree, index: NodeIndex, link: Option<&Link>) -> String {
    let node = tree.node(index);
    let mut label = format!("{} [{}] #{}", node.code, node.node_type, node.node_id);
    if node.title != node.code {
        label.push_str(&format!(" {}", node.title));
    }
    if let Some(link) = link {
        if link.is_reference() {
            label.push_str(" (ref)");
        }
        if !link.attributes.is_mandatory {
            label.push_str(" (optional)");
        }
        if let Some(block) = link.attributes.block {
            label.push_str(&format!(" block {block}"));
        }
        if let Some(credits) = link.attributes.relative_credits {
            label.push_str(&format!(" {credits} ECTS"));
        }
    }
    if let Some(prerequisite) = tree.prerequisites().get(&node.entity_id()) {
        label.push_str(&format!(" <- {prerequisite}"));
    }
    label
}
