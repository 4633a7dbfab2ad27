//! Duplication of trees and year-to-year postponement of trees and versions

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::command::{
    DuplicateProgramTreeCommand, PostponeProgramTreeCommand, PostponeProgramTreeVersionCommand,
};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::repository::{
    FieldValidationRuleProvider, NodeRepository, ProgramTreeRepository, ProgramTreeVersionRepository,
};
use crate::domain::service::CalculateEndPostponement;
use crate::domain::validators::{
    BusinessValidator, CopyProgramTreeVersionValidatorList, PostponeTransitionVersionValidatorList,
};
use crate::domain::{
    DomainError, NodeFactory, ProgramTree, ProgramTreeBuilder, ProgramTreeIdentity,
    ProgramTreeVersionBuilder, ProgramTreeVersionIdentity,
};

pub struct PostponementService {
    tree_repository: Arc<dyn ProgramTreeRepository>,
    version_repository: Arc<dyn ProgramTreeVersionRepository>,
    node_repository: Arc<dyn NodeRepository>,
    field_rules: Arc<dyn FieldValidationRuleProvider>,
    node_factory: Arc<NodeFactory>,
    settings: Arc<Settings>,
}

/// What happened to the tree of one year.
enum Saved {
    Created(ProgramTreeIdentity),
    AlreadyExisted,
}

impl PostponementService {
    pub fn new(
        tree_repository: Arc<dyn ProgramTreeRepository>,
        version_repository: Arc<dyn ProgramTreeVersionRepository>,
        node_repository: Arc<dyn NodeRepository>,
        field_rules: Arc<dyn FieldValidationRuleProvider>,
        node_factory: Arc<NodeFactory>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            tree_repository,
            version_repository,
            node_repository,
            field_rules,
            node_factory,
            settings,
        }
    }

    fn builder(&self) -> ProgramTreeBuilder<'_> {
        ProgramTreeBuilder::new(self.node_factory.as_ref(), self.field_rules.as_ref())
    }

    /// Stores a copy of a tree under new codes: the root and its mandatory children.
    #[instrument(skip(self), fields(from = %cmd.from_root_code, year = cmd.from_root_year))]
    pub fn duplicate_program_tree(&self, cmd: &DuplicateProgramTreeCommand) -> ApplicationResult<ProgramTreeIdentity> {
        let from = self
            .tree_repository
            .get(&ProgramTreeIdentity::new(&cmd.from_root_code, cmd.from_root_year))?;
        let tree = self.builder().copy_to_specific_version(
            &from,
            &cmd.version_name,
            cmd.override_end_year_to,
            cmd.override_start_year_to,
            self.node_repository.as_ref(),
        )?;
        let identity = self.tree_repository.create(&tree)?;
        info!(tree = %identity, "program tree duplicated");
        Ok(identity)
    }

    /// Copies a tree year after year up to its end, capped by the configured horizon.
    ///
    /// Stops at the first year where the tree already existed, after completing
    /// its mandatory children. Returns the created trees.
    #[instrument(skip(self), fields(code = %cmd.from_code, year = cmd.from_year))]
    pub fn postpone_program_tree(&self, cmd: &PostponeProgramTreeCommand) -> ApplicationResult<Vec<ProgramTreeIdentity>> {
        let mut current = self
            .tree_repository
            .get(&ProgramTreeIdentity::new(&cmd.from_code, cmd.from_year))?;
        let end_year = CalculateEndPostponement::calculate_end_postponement_year(
            &current,
            self.settings.max_postponement_year(),
        );

        let mut created = Vec::new();
        while current.root_node().year < end_year {
            let next = self.builder().copy_to_next_year(&current, self.tree_repository.as_ref())?;
            match self.save(&next)? {
                Saved::Created(identity) => created.push(identity),
                Saved::AlreadyExisted => break,
            }
            current = next;
        }
        info!(created = created.len(), end_year, "program tree postponed");
        Ok(created)
    }

    /// Copies a version and its tree year after year up to the version end,
    /// capped by the configured horizon. Returns the created versions.
    ///
    /// A version ending in its own year cannot be copied at all.
    #[instrument(skip(self), fields(from = %cmd.from))]
    pub fn postpone_program_tree_version(
        &self,
        cmd: &PostponeProgramTreeVersionCommand,
    ) -> ApplicationResult<Vec<ProgramTreeVersionIdentity>> {
        let mut version = self.version_repository.get(&cmd.from)?;
        CopyProgramTreeVersionValidatorList::new(&version).validate()?;
        let mut tree = self.tree_repository.get(&version.program_tree_identity)?;
        let max_year = self.settings.max_postponement_year();
        let end_year = version
            .end_year_of_existence
            .map_or(max_year, |end_year| end_year.min(max_year));

        let versions = ProgramTreeVersionBuilder::new();
        let mut created = Vec::new();
        while version.year() < end_year {
            if version.is_transition() {
                PostponeTransitionVersionValidatorList::new(&version, version.year() + 1, self.version_repository.as_ref())
                    .validate()?;
            }

            let next_tree = self.builder().copy_to_next_year(&tree, self.tree_repository.as_ref())?;
            self.save(&next_tree)?;

            let next_version = versions.copy_to_next_year(&version);
            match self.version_repository.create(&next_version) {
                Ok(identity) => created.push(identity),
                Err(DomainError::ProgramTreeVersionAlreadyExists(identity)) => {
                    debug!(version = %identity, "version already postponed");
                    break;
                }
                Err(err) => return Err(err.into()),
            }
            version = next_version;
            tree = next_tree;
        }
        info!(created = created.len(), end_year, "program tree version postponed");
        Ok(created)
    }

    fn save(&self, tree: &ProgramTree) -> ApplicationResult<Saved> {
        match self.tree_repository.create(tree) {
            Ok(identity) => Ok(Saved::Created(identity)),
            Err(DomainError::ProgramTreeAlreadyExists(identity)) => {
                self.tree_repository.update(tree)?;
                debug!(tree = %identity, "existing tree completed");
                Ok(Saved::AlreadyExisted)
            }
            Err(err) => Err(err.into()),
        }
    }
}
