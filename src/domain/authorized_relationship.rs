//! Which child types a parent type accepts, and how many of them.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::domain::node_type::NodeType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedRelationship {
    pub parent_type: NodeType,
    pub child_type: NodeType,
    pub min_count_authorized: u32,
    pub max_count_authorized: u32,
}

impl AuthorizedRelationship {
    pub fn new(
        parent_type: impl Into<NodeType>,
        child_type: impl Into<NodeType>,
        min_count_authorized: u32,
        max_count_authorized: u32,
    ) -> Self {
        Self {
            parent_type: parent_type.into(),
            child_type: child_type.into(),
            min_count_authorized,
            max_count_authorized,
        }
    }
}

/// Immutable relationship table shared by every tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizedRelationshipList {
    relationships: Vec<AuthorizedRelationship>,
}

impl AuthorizedRelationshipList {
    /// A later tuple for an already known `(parent, child)` pair replaces the earlier one.
    pub fn new(relationships: Vec<AuthorizedRelationship>) -> Self {
        let mut unique: Vec<AuthorizedRelationship> = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            match unique.iter_mut().find(|r| {
                r.parent_type == relationship.parent_type && r.child_type == relationship.child_type
            }) {
                Some(existing) => *existing = relationship,
                None => unique.push(relationship),
            }
        }
        Self {
            relationships: unique,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthorizedRelationship> {
        self.relationships.iter()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn is_authorized(&self, parent_type: NodeType, child_type: NodeType) -> bool {
        self.get_authorized_relationship(parent_type, child_type)
            .is_some()
    }

    pub fn get_authorized_relationship(
        &self,
        parent_type: NodeType,
        child_type: NodeType,
    ) -> Option<&AuthorizedRelationship> {
        self.relationships
            .iter()
            .find(|r| r.parent_type == parent_type && r.child_type == child_type)
    }

    pub fn get_authorized_children_types(&self, parent_type: NodeType) -> BTreeSet<NodeType> {
        self.relationships
            .iter()
            .filter(|r| r.parent_type == parent_type)
            .map(|r| r.child_type)
            .collect()
    }

    /// Child types with a minimum of at least one, in display order.
    pub fn get_ordered_mandatory_children_types(&self, parent_type: NodeType) -> Vec<NodeType> {
        self.relationships
            .iter()
            .filter(|r| r.parent_type == parent_type && r.min_count_authorized >= 1)
            .map(|r| r.child_type)
            .sorted_by_key(NodeType::mandatory_rank)
            .collect()
    }
}
