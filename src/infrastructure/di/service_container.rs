//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::{PostponementService, ProgramTreeService, ProgramTreeVersionService};
use crate::config::Settings;
use crate::domain::repository::{
    AuthorizedRelationshipsProvider, FieldValidationRuleProvider, NodeRepository, ProgramTreeRepository,
    ProgramTreeVersionRepository,
};
use crate::domain::NodeFactory;
use crate::infrastructure::fixture::Fixture;
use crate::infrastructure::memory::InMemoryRepository;
use crate::infrastructure::relationships::{ConfigFieldValidationRules, StaticAuthorizedRelationships};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Store behind every repository trait
    pub repository: Arc<InMemoryRepository>,

    /// Id sequence of generated nodes
    pub node_factory: Arc<NodeFactory>,

    pub program_tree_service: ProgramTreeService,
    pub postponement_service: PostponementService,
    pub version_service: ProgramTreeVersionService,
}

impl ServiceContainer {
    /// Create a container over the content of a fixture.
    pub fn new(settings: Settings, fixture: Fixture) -> InfraResult<Self> {
        let repository = Arc::new(fixture.into_repository()?);
        Self::with_deps(settings, repository)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, repository: Arc<InMemoryRepository>) -> InfraResult<Self> {
        let field_rules: Arc<dyn FieldValidationRuleProvider> =
            Arc::new(ConfigFieldValidationRules::from_settings(&settings)?);
        let settings = Arc::new(settings);
        let node_factory = Arc::new(NodeFactory::new(settings.first_generated_node_id));
        let relationships: Arc<dyn AuthorizedRelationshipsProvider> =
            Arc::new(StaticAuthorizedRelationships::shared(repository.relationships()));

        let trees: Arc<dyn ProgramTreeRepository> = repository.clone();
        let versions: Arc<dyn ProgramTreeVersionRepository> = repository.clone();
        let nodes: Arc<dyn NodeRepository> = repository.clone();

        let program_tree_service = ProgramTreeService::new(
            Arc::clone(&trees),
            Arc::clone(&versions),
            Arc::clone(&nodes),
            Arc::clone(&settings),
        );
        let postponement_service = PostponementService::new(
            Arc::clone(&trees),
            Arc::clone(&versions),
            Arc::clone(&nodes),
            Arc::clone(&field_rules),
            Arc::clone(&node_factory),
            Arc::clone(&settings),
        );
        let version_service = ProgramTreeVersionService::new(
            trees,
            versions,
            nodes,
            relationships,
            field_rules,
            Arc::clone(&node_factory),
        );
        debug!(nodes = repository.node_count(), "services wired");

        Ok(Self {
            settings,
            repository,
            node_factory,
            program_tree_service,
            postponement_service,
            version_service,
        })
    }
}
