//! Cardinality rules between parent and child types.

use std::collections::HashMap;

use itertools::Itertools;

use crate::domain::error::{BusinessError, DomainResult};
use crate::domain::link::LinkAttributes;
use crate::domain::node::Node;
use crate::domain::node_type::{LinkType, NodeType};
use crate::domain::program_tree::{NodeIndex, ProgramTree};

use super::{fail, fail_all, BusinessValidator};

fn type_counts(tree: &ProgramTree, parent: NodeIndex) -> HashMap<NodeType, usize> {
    tree.get_children_types(parent, true).into_iter().counts()
}

/// Types brought under a parent by the link to `child`.
fn types_brought_by(tree: &ProgramTree, parent: NodeIndex, child: NodeIndex) -> Vec<NodeType> {
    match tree.get_link(parent, child) {
        Some(link) if link.is_reference() => tree
            .children_as_nodes_with_respect_to_reference_link(child)
            .into_iter()
            .map(|index| tree.node(index).node_type)
            .collect(),
        _ => vec![tree.node(child).node_type],
    }
}

/// Checks the children of `parent` once it is linked to `child`.
///
/// The tree must already contain the link.
pub struct AuthorizedRelationshipValidator<'a> {
    tree: &'a ProgramTree,
    parent: NodeIndex,
    child: NodeIndex,
}

impl<'a> AuthorizedRelationshipValidator<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, child: NodeIndex) -> Self {
        Self {
            tree,
            parent,
            child,
        }
    }
}

impl BusinessValidator for AuthorizedRelationshipValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let Some(link) = self.tree.get_link(self.parent, self.child) else {
            return Ok(());
        };
        let parent = self.tree.node(self.parent);
        let child = self.tree.node(self.child);
        if link.is_reference() && parent.is_minor_major_list_choice() && child.is_minor_or_deepening() {
            return Ok(());
        }

        let relationships = self.tree.authorized_relationships();
        let brought: Vec<NodeType> = types_brought_by(self.tree, self.parent, self.child)
            .into_iter()
            .unique()
            .sorted()
            .collect();
        let mut errors = Vec::new();

        let unauthorized: Vec<NodeType> = brought
            .iter()
            .copied()
            .filter(|t| !relationships.is_authorized(parent.node_type, *t))
            .collect();
        if !unauthorized.is_empty() {
            errors.push(BusinessError::ChildTypeNotAuthorized {
                parent: parent.entity_id(),
                parent_type: parent.node_type,
                child_types: unauthorized,
            });
        }

        let counts = type_counts(self.tree, self.parent);
        let count = |t: &NodeType| counts.get(t).copied().unwrap_or(0);
        let full: Vec<NodeType> = brought
            .iter()
            .copied()
            .filter(|t| {
                relationships
                    .get_authorized_relationship(parent.node_type, *t)
                    .is_some_and(|r| count(t) > r.max_count_authorized as usize)
            })
            .collect();
        if !full.is_empty() {
            errors.push(BusinessError::MaximumChildTypesReached {
                parent: parent.entity_id(),
                child_types: full,
            });
        }

        // a mandatory child turned into a reference no longer counts for itself
        if link.is_reference() {
            let child_type = child.node_type;
            if let Some(relationship) =
                relationships.get_authorized_relationship(parent.node_type, child_type)
            {
                let minimum = relationship.min_count_authorized as usize;
                if minimum >= 1 && count(&child_type) < minimum {
                    errors.push(BusinessError::MinimumChildTypesReached {
                        parent: parent.entity_id(),
                        child_types: vec![child_type],
                    });
                }
            }
        }

        fail_all(errors)
    }
}

/// Simulates the paste on a copy of the tree, then checks cardinalities.
pub struct PasteAuthorizedRelationshipValidator {
    simulated: Option<(ProgramTree, NodeIndex, NodeIndex)>,
}

impl PasteAuthorizedRelationshipValidator {
    pub fn new(
        tree: &ProgramTree,
        parent: NodeIndex,
        tree_to_paste: &ProgramTree,
        link_type: Option<LinkType>,
    ) -> Self {
        Self {
            simulated: Self::simulate(tree, parent, tree_to_paste, link_type),
        }
    }

    fn simulate(
        tree: &ProgramTree,
        parent: NodeIndex,
        tree_to_paste: &ProgramTree,
        link_type: Option<LinkType>,
    ) -> Option<(ProgramTree, NodeIndex, NodeIndex)> {
        let parent_node = tree.node(parent);
        let child_node = tree_to_paste.root_node();
        if parent_node.is_minor_major_option_list_choice() && child_node.is_minor_major_option_list_choice() {
            return None;
        }
        // cycles and leaves are reported by their own validators
        if parent_node.is_learning_unit() || tree.creates_cycle(parent, tree_to_paste) {
            return None;
        }
        let mut simulated = tree.clone();
        let child = simulated.import_subtree(tree_to_paste, tree_to_paste.root());
        let attributes = LinkAttributes {
            link_type,
            ..LinkAttributes::default()
        };
        simulated.add_link(parent, child, attributes).ok()?;
        Some((simulated, parent, child))
    }
}

impl BusinessValidator for PasteAuthorizedRelationshipValidator {
    fn validate(&self) -> DomainResult<()> {
        match &self.simulated {
            Some((tree, parent, child)) => {
                AuthorizedRelationshipValidator::new(tree, *parent, *child).validate()
            }
            None => Ok(()),
        }
    }
}

/// Same check on a tree whose link attributes were already updated.
pub struct UpdateLinkAuthorizedRelationshipValidator<'a> {
    inner: AuthorizedRelationshipValidator<'a>,
}

impl<'a> UpdateLinkAuthorizedRelationshipValidator<'a> {
    pub fn new(updated_tree: &'a ProgramTree, parent: NodeIndex, child: NodeIndex) -> Self {
        Self {
            inner: AuthorizedRelationshipValidator::new(updated_tree, parent, child),
        }
    }
}

impl BusinessValidator for UpdateLinkAuthorizedRelationshipValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        self.inner.validate()
    }
}

/// Learning units are only checked for authorization.
pub struct AuthorizedRelationshipLearningUnitValidator<'a> {
    tree: &'a ProgramTree,
    parent: NodeIndex,
    node_to_paste: &'a Node,
}

impl<'a> AuthorizedRelationshipLearningUnitValidator<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, node_to_paste: &'a Node) -> Self {
        Self {
            tree,
            parent,
            node_to_paste,
        }
    }
}

impl BusinessValidator for AuthorizedRelationshipLearningUnitValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let parent = self.tree.node(self.parent);
        let child_type = self.node_to_paste.node_type;
        if !self
            .tree
            .authorized_relationships()
            .is_authorized(parent.node_type, child_type)
        {
            return fail(BusinessError::ChildTypeNotAuthorized {
                parent: parent.entity_id(),
                parent_type: parent.node_type,
                child_types: vec![child_type],
            });
        }
        Ok(())
    }
}

/// Removing `child` must not leave `parent` under its minimum cardinalities.
pub struct DetachAuthorizedRelationshipValidator<'a> {
    tree: &'a ProgramTree,
    parent: NodeIndex,
    child: NodeIndex,
}

impl<'a> DetachAuthorizedRelationshipValidator<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, child: NodeIndex) -> Self {
        Self {
            tree,
            parent,
            child,
        }
    }
}

impl BusinessValidator for DetachAuthorizedRelationshipValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let parent = self.tree.node(self.parent);
        let relationships = self.tree.authorized_relationships();
        let counts = type_counts(self.tree, self.parent);
        let removed = types_brought_by(self.tree, self.parent, self.child)
            .into_iter()
            .counts();

        let below_minimum: Vec<NodeType> = removed
            .iter()
            .filter(|(child_type, removed_count)| {
                relationships
                    .get_authorized_relationship(parent.node_type, **child_type)
                    .is_some_and(|r| {
                        let remaining = counts
                            .get(child_type)
                            .copied()
                            .unwrap_or(0)
                            .saturating_sub(**removed_count);
                        r.min_count_authorized >= 1 && remaining < r.min_count_authorized as usize
                    })
            })
            .map(|(child_type, _)| *child_type)
            .sorted()
            .collect();

        if below_minimum.is_empty() {
            Ok(())
        } else {
            fail(BusinessError::MinimumChildTypesReached {
                parent: parent.entity_id(),
                child_types: below_minimum,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::authorized_relationship::{AuthorizedRelationship, AuthorizedRelationshipList};
    use crate::domain::node_type::{GroupType, TrainingType};

    fn relationships() -> Arc<AuthorizedRelationshipList> {
        Arc::new(AuthorizedRelationshipList::new(vec![
            AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
            AuthorizedRelationship::new(GroupType::CommonCore, GroupType::SubGroup, 0, 2),
            AuthorizedRelationship::new(GroupType::SubGroup, NodeType::LearningUnit, 0, 99),
        ]))
    }

    fn bachelor() -> ProgramTree {
        let root = Node::group(1, "LBIR100B", 2020, TrainingType::Bachelor);
        let mut tree = ProgramTree::new(root, relationships());
        tree.add_child(
            tree.root(),
            Node::group(2, "LBIR101T", 2020, GroupType::CommonCore),
            LinkAttributes::default(),
        )
        .unwrap();
        tree
    }

    fn single(node: Node) -> ProgramTree {
        ProgramTree::new(node, relationships())
    }

    #[test]
    fn given_unauthorized_type_when_pasting_then_child_type_not_authorized() {
        // Arrange
        let tree = bachelor();
        let common_core = tree.get_node_by_path("1|2").unwrap();
        let pasted = single(Node::group(9, "LBIR109T", 2020, GroupType::CommonCore));

        // Act
        let result = PasteAuthorizedRelationshipValidator::new(&tree, common_core, &pasted, None).validate();

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.business_errors().unwrap().codes(), vec!["ChildTypeNotAuthorized"]);
    }

    #[test]
    fn given_full_parent_when_pasting_then_maximum_reached() {
        // Arrange
        let tree = bachelor();
        let pasted = single(Node::group(9, "LBIR109T", 2020, GroupType::CommonCore));

        // Act
        let result = PasteAuthorizedRelationshipValidator::new(&tree, tree.root(), &pasted, None).validate();

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.business_errors().unwrap().codes(), vec!["MaximumChildTypesReached"]);
    }

    #[test]
    fn given_mandatory_child_when_detaching_then_minimum_reached() {
        // Arrange
        let tree = bachelor();
        let common_core = tree.get_node_by_path("1|2").unwrap();

        // Act
        let result = DetachAuthorizedRelationshipValidator::new(&tree, tree.root(), common_core).validate();

        // Assert
        let err = result.unwrap_err();
        assert_eq!(err.business_errors().unwrap().codes(), vec!["MinimumChildTypesReached"]);
    }

    #[test]
    fn given_optional_child_when_detaching_then_ok() {
        // Arrange
        let mut tree = bachelor();
        let common_core = tree.get_node_by_path("1|2").unwrap();
        let sub_group = tree
            .add_child(
                common_core,
                Node::group(3, "LBIR102G", 2020, GroupType::SubGroup),
                LinkAttributes::default(),
            )
            .unwrap();

        // Act
        let result = DetachAuthorizedRelationshipValidator::new(&tree, common_core, sub_group).validate();

        // Assert
        assert!(result.is_ok());
    }
}
