//! Creation, update and deletion of program tree versions

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::command::{
    CreateSpecificVersionCommand, CreateStandardVersionCommand, DeleteProgramTreeCommand,
    DeleteProgramTreeVersionCommand, UpdateProgramTreeVersionCommand,
};
use crate::application::ApplicationResult;
use crate::domain::repository::{
    AuthorizedRelationshipsProvider, FieldValidationRuleProvider, NodeRepository, ProgramTreeRepository,
    ProgramTreeVersionRepository,
};
use crate::domain::validators::{
    BusinessValidator, DeleteProgramTreeValidatorList, DeleteStandardVersionValidatorList,
    NodeHaveLinkValidator, UpdateProgramTreeVersionValidatorList,
};
use crate::domain::{
    DomainError, NewVersionAttributes, NodeFactory, NodeIdentity, ProgramTreeBuilder, ProgramTreeIdentity,
    ProgramTreeVersionBuilder, ProgramTreeVersionIdentity,
};

pub struct ProgramTreeVersionService {
    tree_repository: Arc<dyn ProgramTreeRepository>,
    version_repository: Arc<dyn ProgramTreeVersionRepository>,
    node_repository: Arc<dyn NodeRepository>,
    relationships: Arc<dyn AuthorizedRelationshipsProvider>,
    field_rules: Arc<dyn FieldValidationRuleProvider>,
    node_factory: Arc<NodeFactory>,
}

impl ProgramTreeVersionService {
    pub fn new(
        tree_repository: Arc<dyn ProgramTreeRepository>,
        version_repository: Arc<dyn ProgramTreeVersionRepository>,
        node_repository: Arc<dyn NodeRepository>,
        relationships: Arc<dyn AuthorizedRelationshipsProvider>,
        field_rules: Arc<dyn FieldValidationRuleProvider>,
        node_factory: Arc<NodeFactory>,
    ) -> Self {
        Self {
            tree_repository,
            version_repository,
            node_repository,
            relationships,
            field_rules,
            node_factory,
        }
    }

    fn builder(&self) -> ProgramTreeBuilder<'_> {
        ProgramTreeBuilder::new(self.node_factory.as_ref(), self.field_rules.as_ref())
    }

    /// Creates the tree of a stored root group, with its mandatory children,
    /// and the standard version of the offer on it.
    #[instrument(skip(self), fields(offer = %cmd.offer_acronym, code = %cmd.code, year = cmd.year))]
    pub fn create_standard_version(
        &self,
        cmd: &CreateStandardVersionCommand,
    ) -> ApplicationResult<ProgramTreeVersionIdentity> {
        let requested = ProgramTreeVersionIdentity::standard(&cmd.offer_acronym, cmd.year);
        if self.version_repository.get(&requested).is_ok() {
            return Err(DomainError::ProgramTreeVersionAlreadyExists(requested).into());
        }

        let root = self.node_repository.get(&NodeIdentity::new(&cmd.code, cmd.year))?;
        let tree = self.builder().build_from_orphan_group_as_root(
            root,
            self.relationships.get(),
            self.node_repository.as_ref(),
        )?;
        let mut version = ProgramTreeVersionBuilder::new().build_standard_version(tree.entity_id(), &cmd.offer_acronym);
        version.title_fr = cmd.title_fr.clone();
        version.title_en = cmd.title_en.clone();
        version.end_year_of_existence = cmd.end_year_of_existence;

        self.tree_repository.create(&tree)?;
        let identity = self.version_repository.create(&version)?;
        info!(version = %identity, "standard version created");
        Ok(identity)
    }

    /// Derives a specific or transition version from the standard version of the same year.
    #[instrument(skip(self), fields(offer = %cmd.offer_acronym, name = %cmd.version_name, year = cmd.year))]
    pub fn create_specific_version(
        &self,
        cmd: &CreateSpecificVersionCommand,
    ) -> ApplicationResult<ProgramTreeVersionIdentity> {
        let standard = self
            .version_repository
            .get(&ProgramTreeVersionIdentity::standard(&cmd.offer_acronym, cmd.year))?;
        let requested = ProgramTreeVersionIdentity::new(
            &cmd.offer_acronym,
            cmd.year,
            cmd.version_name.to_uppercase(),
            cmd.is_transition,
        );
        if self.version_repository.get(&requested).is_ok() {
            return Err(DomainError::ProgramTreeVersionAlreadyExists(requested).into());
        }

        let standard_tree = self.tree_repository.get(&standard.program_tree_identity)?;
        let tree = self.builder().copy_to_specific_version(
            &standard_tree,
            &requested.version_name,
            cmd.end_year_of_existence,
            None,
            self.node_repository.as_ref(),
        )?;
        let attributes = NewVersionAttributes {
            version_name: cmd.version_name.clone(),
            is_transition: cmd.is_transition,
            title_fr: cmd.title_fr.clone(),
            title_en: cmd.title_en.clone(),
            end_year_of_existence: cmd.end_year_of_existence,
        };
        let version = ProgramTreeVersionBuilder::new().build_from(&standard, attributes, tree.entity_id())?;

        let tree_identity = self.tree_repository.create(&tree)?;
        let identity = match self.version_repository.create(&version) {
            Ok(identity) => identity,
            Err(err) => {
                // the copy only holds nodes generated for this version
                warn!(tree = %tree_identity, "version refused, dropping its tree");
                self.tree_repository.delete(&tree_identity)?;
                return Err(err.into());
            }
        };
        info!(version = %identity, tree = %tree_identity, "specific version created");
        Ok(identity)
    }

    /// Changes titles and end year; the tree root follows the new end year.
    #[instrument(skip(self), fields(version = %cmd.identity))]
    pub fn update_program_tree_version(
        &self,
        cmd: &UpdateProgramTreeVersionCommand,
    ) -> ApplicationResult<ProgramTreeVersionIdentity> {
        let mut version = self.version_repository.get(&cmd.identity)?;
        let mut tree = self.tree_repository.get(&version.program_tree_identity)?;
        let root = tree.root();
        tree.node_mut(root).end_year = cmd.end_year_of_existence;
        UpdateProgramTreeVersionValidatorList::new(&tree, self.tree_repository.as_ref()).validate()?;

        version.title_fr = cmd.title_fr.clone();
        version.title_en = cmd.title_en.clone();
        version.end_year_of_existence = cmd.end_year_of_existence;
        self.tree_repository.update(&tree)?;
        let identity = self.version_repository.update(&version)?;
        info!(version = %identity, end_year = ?cmd.end_year_of_existence, "version updated");
        Ok(identity)
    }

    /// Deletes a tree limited to its generated mandatory groups and used nowhere else.
    #[instrument(skip(self), fields(code = %cmd.code, year = cmd.year))]
    pub fn delete_program_tree(&self, cmd: &DeleteProgramTreeCommand) -> ApplicationResult<ProgramTreeIdentity> {
        let identity = ProgramTreeIdentity::new(&cmd.code, cmd.year);
        let tree = self.tree_repository.get(&identity)?;
        DeleteProgramTreeValidatorList::new(&tree, self.tree_repository.as_ref()).validate()?;
        self.tree_repository.delete(&identity)?;
        info!(tree = %identity, "program tree deleted");
        Ok(identity)
    }

    /// Deletes a version, then its tree when no other version uses it.
    ///
    /// The standard version goes only once no other version of the offer
    /// exists that year.
    #[instrument(skip(self), fields(version = %cmd.identity))]
    pub fn delete_program_tree_version(
        &self,
        cmd: &DeleteProgramTreeVersionCommand,
    ) -> ApplicationResult<ProgramTreeVersionIdentity> {
        let version = self.version_repository.get(&cmd.identity)?;
        DeleteStandardVersionValidatorList::new(&version, self.version_repository.as_ref()).validate()?;

        let tree_identity = version.program_tree_identity.clone();
        let tree = match self.tree_repository.get(&tree_identity) {
            Ok(tree) => Some(tree),
            Err(DomainError::ProgramTreeNotFound(_)) => {
                warn!(tree = %tree_identity, "version without tree");
                None
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(tree) = &tree {
            NodeHaveLinkValidator::new(tree, self.tree_repository.as_ref()).validate()?;
        }

        self.version_repository.delete(&cmd.identity)?;
        let still_used = !self
            .version_repository
            .search_all_versions_from_root_node(&NodeIdentity::from(&tree_identity))?
            .is_empty();
        if tree.is_some() && !still_used {
            self.tree_repository.delete(&tree_identity)?;
            debug!(tree = %tree_identity, "tree of the version deleted");
        }
        info!(version = %cmd.identity, "version deleted");
        Ok(cmd.identity.clone())
    }
}
