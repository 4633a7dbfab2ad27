//! Boundaries the domain consumes: storage of trees, versions and nodes,
//! and the providers of static reference data.
//!
//! All traits require `Send + Sync` so implementations can be shared behind `Arc`.

use std::sync::Arc;

use crate::domain::authorized_relationship::AuthorizedRelationshipList;
use crate::domain::error::DomainResult;
use crate::domain::identity::{NodeIdentity, ProgramTreeIdentity, ProgramTreeVersionIdentity};
use crate::domain::node::{Node, NodeId};
use crate::domain::node_type::NodeType;
use crate::domain::program_tree::ProgramTree;
use crate::domain::program_tree_version::ProgramTreeVersion;

pub trait ProgramTreeRepository: Send + Sync {
    /// Fails with `ProgramTreeNotFound` when no node has this identity.
    fn get(&self, identity: &ProgramTreeIdentity) -> DomainResult<ProgramTree>;

    /// Unknown identities are skipped.
    fn search(&self, identities: &[ProgramTreeIdentity]) -> DomainResult<Vec<ProgramTree>>;

    /// Trees containing any of `identities`, rooted at their trainings,
    /// mini-trainings and parentless ancestors.
    fn search_from_children(&self, identities: &[NodeIdentity]) -> DomainResult<Vec<ProgramTree>>;

    /// Fails with `ProgramTreeAlreadyExists` when the root is already stored.
    fn create(&self, tree: &ProgramTree) -> DomainResult<ProgramTreeIdentity>;

    fn update(&self, tree: &ProgramTree) -> DomainResult<ProgramTreeIdentity>;

    /// Removes the root and the content no other tree uses.
    fn delete(&self, identity: &ProgramTreeIdentity) -> DomainResult<()>;
}

pub trait ProgramTreeVersionRepository: Send + Sync {
    fn get(&self, identity: &ProgramTreeVersionIdentity) -> DomainResult<ProgramTreeVersion>;

    /// Versions whose tree is rooted at `node`, ordered by version name.
    fn search_all_versions_from_root_node(
        &self,
        node: &NodeIdentity,
    ) -> DomainResult<Vec<ProgramTreeVersion>>;

    fn search_versions_from_trees(
        &self,
        trees: &[ProgramTree],
    ) -> DomainResult<Vec<ProgramTreeVersion>>;

    /// Every version of an offer in one year.
    fn search_versions_of_offer(
        &self,
        offer_acronym: &str,
        year: u32,
    ) -> DomainResult<Vec<ProgramTreeVersion>>;

    /// Closest version at or before `identity.year` with the same offer and name.
    fn get_last_in_past(
        &self,
        identity: &ProgramTreeVersionIdentity,
    ) -> DomainResult<ProgramTreeVersion>;

    fn create(&self, version: &ProgramTreeVersion) -> DomainResult<ProgramTreeVersionIdentity>;

    fn update(&self, version: &ProgramTreeVersion) -> DomainResult<ProgramTreeVersionIdentity>;

    fn delete(&self, identity: &ProgramTreeVersionIdentity) -> DomainResult<()>;
}

pub trait NodeRepository: Send + Sync {
    fn get(&self, identity: &NodeIdentity) -> DomainResult<Node>;

    fn get_by_node_id(&self, node_id: NodeId) -> DomainResult<Node>;

    /// Unknown identities are skipped.
    fn search(&self, identities: &[NodeIdentity]) -> DomainResult<Vec<Node>>;
}

pub trait AuthorizedRelationshipsProvider: Send + Sync {
    fn get(&self) -> Arc<AuthorizedRelationshipList>;
}

/// Initial value of a field when a node is created by the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValidationRule {
    pub initial_value: Option<String>,
}

pub trait FieldValidationRuleProvider: Send + Sync {
    fn get(&self, node_type: NodeType, field: &str, is_version: bool) -> FieldValidationRule;
}
