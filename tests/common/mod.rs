//! Shared builders for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use progtree::application::ApplicationError;
use progtree::config::Settings;
use progtree::domain::repository::ProgramTreeRepository;
use progtree::domain::{
    AuthorizedRelationship, AuthorizedRelationshipList, LinkAttributes, Node, NodeIdentity, ProgramTree,
    ProgramTreeIdentity,
};
use progtree::infrastructure::{InMemoryRepository, ServiceContainer};
use progtree::util::testing;

pub const YEAR: u32 = 2020;

pub fn repository(relationships: Vec<AuthorizedRelationship>) -> InMemoryRepository {
    testing::init_test_setup();
    InMemoryRepository::new(Arc::new(AuthorizedRelationshipList::new(relationships)))
}

pub fn repository_with(relationships: AuthorizedRelationshipList) -> InMemoryRepository {
    testing::init_test_setup();
    InMemoryRepository::new(Arc::new(relationships))
}

/// Stores `nodes`, links them by code (all in [`YEAR`]) and registers the first node as a tree.
pub fn store_tree(repository: &InMemoryRepository, nodes: Vec<Node>, links: &[(&str, &str)]) {
    let root = nodes.first().map(Node::entity_id);
    for node in nodes {
        repository.insert_node(node);
    }
    for (parent, child) in links {
        link(repository, parent, child, LinkAttributes::default());
    }
    if let Some(root) = root {
        repository.register_tree(ProgramTreeIdentity::from(&root));
    }
}

pub fn link(repository: &InMemoryRepository, parent: &str, child: &str, attributes: LinkAttributes) {
    repository
        .insert_link(&NodeIdentity::new(parent, YEAR), &NodeIdentity::new(child, YEAR), attributes)
        .unwrap();
}

pub fn settings() -> Settings {
    Settings {
        current_academic_year: Some(YEAR),
        ..Settings::default()
    }
}

pub fn container(repository: InMemoryRepository) -> ServiceContainer {
    ServiceContainer::with_deps(settings(), Arc::new(repository)).unwrap()
}

pub fn get_tree(container: &ServiceContainer, code: &str, year: u32) -> ProgramTree {
    ProgramTreeRepository::get(container.repository.as_ref(), &ProgramTreeIdentity::new(code, year)).unwrap()
}

/// Error kinds of a rejected action; panics on any other failure.
pub fn business_codes(error: &ApplicationError) -> Vec<&'static str> {
    error
        .business_errors()
        .unwrap_or_else(|| panic!("expected business errors, got {error}"))
        .codes()
}
