//! Rules on versions, copies to the next year and deletions.

use crate::domain::error::{BusinessError, DomainResult};
use crate::domain::node_type::NodeType;
use crate::domain::program_tree::{NodeIndex, ProgramTree};
use crate::domain::program_tree_version::ProgramTreeVersion;
use crate::domain::repository::{ProgramTreeRepository, ProgramTreeVersionRepository};
use crate::domain::service::search_trees_using_node;

use super::{fail, BusinessValidator};

/// A pasted tree must carry the version of the trees it joins.
pub struct MatchVersionValidator<'a> {
    working_tree: &'a ProgramTree,
    parent: NodeIndex,
    tree_to_paste: &'a ProgramTree,
    tree_repository: &'a dyn ProgramTreeRepository,
    version_repository: &'a dyn ProgramTreeVersionRepository,
}

impl<'a> MatchVersionValidator<'a> {
    pub fn new(
        working_tree: &'a ProgramTree,
        parent: NodeIndex,
        tree_to_paste: &'a ProgramTree,
        tree_repository: &'a dyn ProgramTreeRepository,
        version_repository: &'a dyn ProgramTreeVersionRepository,
    ) -> Self {
        Self {
            working_tree,
            parent,
            tree_to_paste,
            tree_repository,
            version_repository,
        }
    }
}

impl BusinessValidator for MatchVersionValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let child = self.tree_to_paste.root_node();
        if child.is_learning_unit() {
            return Ok(());
        }
        let child_versions = self
            .version_repository
            .search_all_versions_from_root_node(&child.entity_id())?;
        let Some(child_version) = child_versions.first() else {
            return Ok(());
        };
        let child_label = (child_version.version_name(), child_version.is_transition());

        let parent = self.working_tree.node(self.parent).entity_id();
        let trees = search_trees_using_node(self.working_tree, &parent, self.tree_repository)?;
        let parent_versions = self.version_repository.search_versions_from_trees(&trees)?;
        let mismatch = parent_versions
            .iter()
            .filter(|version| !version.is_standard())
            .find(|version| (version.version_name(), version.is_transition()) != child_label);

        match mismatch {
            Some(expected) => fail(BusinessError::ProgramTreeVersionMismatch {
                node: child.entity_id(),
                expected: expected.version_label(),
                found: child_version.version_label(),
            }),
            None => Ok(()),
        }
    }
}

pub struct CheckProgramTreeEndDateValidator<'a> {
    tree: &'a ProgramTree,
}

impl<'a> CheckProgramTreeEndDateValidator<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self { tree }
    }
}

impl BusinessValidator for CheckProgramTreeEndDateValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let root = self.tree.root_node();
        match root.end_year {
            Some(end_year) if end_year < root.year + 1 => fail(BusinessError::CannotCopyTreeDueToEndDate {
                tree: self.tree.entity_id(),
                end_year,
            }),
            _ => Ok(()),
        }
    }
}

pub struct CheckTreeVersionEndDateValidator<'a> {
    version: &'a ProgramTreeVersion,
}

impl<'a> CheckTreeVersionEndDateValidator<'a> {
    pub fn new(version: &'a ProgramTreeVersion) -> Self {
        Self { version }
    }
}

impl BusinessValidator for CheckTreeVersionEndDateValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        match self.version.end_year_of_existence {
            Some(end_year) if end_year < self.version.year() + 1 => {
                fail(BusinessError::CannotCopyTreeVersionDueToEndDate {
                    version: self.version.entity_identity.clone(),
                    end_year,
                })
            }
            _ => Ok(()),
        }
    }
}

/// The standard version goes last: specific versions of the same year block its deletion.
pub struct CheckVersionsEndDateValidator<'a> {
    version: &'a ProgramTreeVersion,
    version_repository: &'a dyn ProgramTreeVersionRepository,
}

impl<'a> CheckVersionsEndDateValidator<'a> {
    pub fn new(version: &'a ProgramTreeVersion, version_repository: &'a dyn ProgramTreeVersionRepository) -> Self {
        Self {
            version,
            version_repository,
        }
    }
}

impl BusinessValidator for CheckVersionsEndDateValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !self.version.is_standard() {
            return Ok(());
        }
        let others: Vec<String> = self
            .version_repository
            .search_versions_of_offer(self.version.offer_acronym(), self.version.year())?
            .iter()
            .filter(|version| !version.is_standard())
            .map(ProgramTreeVersion::version_label)
            .collect();
        if others.is_empty() {
            return Ok(());
        }
        fail(BusinessError::CannotDeleteStandardDueToVersionEndDate {
            offer_acronym: self.version.offer_acronym().to_string(),
            year: self.version.year(),
            versions: others,
        })
    }
}

/// Only trees made of the mandatory groups generated with their root may be deleted.
pub struct EmptyProgramTreeValidator<'a> {
    tree: &'a ProgramTree,
}

impl<'a> EmptyProgramTreeValidator<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self { tree }
    }

    fn has_only_generated_content(&self, index: NodeIndex) -> bool {
        let node = self.tree.node(index);
        let mandatory: Vec<NodeType> = self
            .tree
            .authorized_relationships()
            .get_ordered_mandatory_children_types(node.node_type);
        node.children.iter().all(|link| {
            let child = self.tree.node(link.child);
            !link.is_reference()
                && mandatory.contains(&child.node_type)
                && self.has_only_generated_content(link.child)
        })
    }
}

impl BusinessValidator for EmptyProgramTreeValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if self.has_only_generated_content(self.tree.root()) {
            return Ok(());
        }
        fail(BusinessError::ProgramTreeNonEmpty {
            tree: self.tree.entity_id(),
        })
    }
}

/// The root of a deleted tree must not be used by any other tree.
pub struct NodeHaveLinkValidator<'a> {
    tree: &'a ProgramTree,
    tree_repository: &'a dyn ProgramTreeRepository,
}

impl<'a> NodeHaveLinkValidator<'a> {
    pub fn new(tree: &'a ProgramTree, tree_repository: &'a dyn ProgramTreeRepository) -> Self {
        Self {
            tree,
            tree_repository,
        }
    }
}

impl BusinessValidator for NodeHaveLinkValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let root = self.tree.root_node().entity_id();
        let own = self.tree.entity_id();
        let used_elsewhere = self
            .tree_repository
            .search_from_children(std::slice::from_ref(&root))?
            .iter()
            .any(|tree| tree.entity_id() != own);
        if used_elsewhere {
            return fail(BusinessError::NodeHaveLink { node: root });
        }
        Ok(())
    }
}

/// A transition may only be extended into a year without another transition.
pub struct TransitionExtensionValidator<'a> {
    version: &'a ProgramTreeVersion,
    year: u32,
    version_repository: &'a dyn ProgramTreeVersionRepository,
}

impl<'a> TransitionExtensionValidator<'a> {
    pub fn new(
        version: &'a ProgramTreeVersion,
        year: u32,
        version_repository: &'a dyn ProgramTreeVersionRepository,
    ) -> Self {
        Self {
            version,
            year,
            version_repository,
        }
    }
}

impl BusinessValidator for TransitionExtensionValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !self.version.is_transition() {
            return Ok(());
        }
        let other = self
            .version_repository
            .search_versions_of_offer(self.version.offer_acronym(), self.year)?
            .into_iter()
            .find(|candidate| {
                candidate.is_transition() && candidate.version_name() != self.version.version_name()
            });
        match other {
            Some(other) => fail(BusinessError::CannotExtendTransitionDueToExistenceOfOtherTransition {
                version: self.version.entity_identity.clone(),
                year: self.year,
                other_version_name: other.version_name().to_string(),
            }),
            None => Ok(()),
        }
    }
}
