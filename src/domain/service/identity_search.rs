//! Translations between node ids, node identities, tree identities and version identities.

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::{NodeIdentity, ProgramTreeIdentity, ProgramTreeVersionIdentity};
use crate::domain::node::NodeId;
use crate::domain::repository::{NodeRepository, ProgramTreeVersionRepository};

pub struct NodeIdentitySearch<'a> {
    node_repository: &'a dyn NodeRepository,
}

impl<'a> NodeIdentitySearch<'a> {
    pub fn new(node_repository: &'a dyn NodeRepository) -> Self {
        Self { node_repository }
    }

    pub fn get_from_node_id(&self, node_id: NodeId) -> DomainResult<NodeIdentity> {
        Ok(self.node_repository.get_by_node_id(node_id)?.entity_id())
    }
}

pub struct ProgramTreeIdentitySearch<'a> {
    node_repository: &'a dyn NodeRepository,
}

impl<'a> ProgramTreeIdentitySearch<'a> {
    pub fn new(node_repository: &'a dyn NodeRepository) -> Self {
        Self { node_repository }
    }

    /// Identity of the tree rooted at the node `node_id`.
    pub fn get_from_node_id(&self, node_id: NodeId) -> DomainResult<ProgramTreeIdentity> {
        NodeIdentitySearch::new(self.node_repository)
            .get_from_node_id(node_id)
            .map(ProgramTreeIdentity::from)
    }

    /// Identity of the tree rooted at the node of the first element of `path`.
    pub fn get_from_path(&self, path: &str) -> DomainResult<ProgramTreeIdentity> {
        let root_id = path
            .split(crate::domain::program_tree::PATH_SEPARATOR)
            .next()
            .and_then(|id| id.trim().parse::<NodeId>().ok())
            .ok_or_else(|| DomainError::NodeNotFound {
                path: path.to_string(),
            })?;
        self.get_from_node_id(root_id)
    }
}

pub struct ProgramTreeVersionIdentitySearch<'a> {
    version_repository: &'a dyn ProgramTreeVersionRepository,
}

impl<'a> ProgramTreeVersionIdentitySearch<'a> {
    pub fn new(version_repository: &'a dyn ProgramTreeVersionRepository) -> Self {
        Self { version_repository }
    }

    /// Version whose tree is rooted at `node`.
    pub fn get_from_node_identity(&self, node: &NodeIdentity) -> DomainResult<ProgramTreeVersionIdentity> {
        self.version_repository
            .search_all_versions_from_root_node(node)?
            .into_iter()
            .next()
            .map(|version| version.entity_identity)
            .ok_or_else(|| DomainError::ProgramTreeNotFound(node.clone().into()))
    }

    /// Identity of the tree carrying `version`.
    pub fn get_tree_identity(&self, version: &ProgramTreeVersionIdentity) -> DomainResult<ProgramTreeIdentity> {
        Ok(self.version_repository.get(version)?.program_tree_identity)
    }
}
