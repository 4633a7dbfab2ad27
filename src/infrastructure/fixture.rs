//! TOML fixtures seeding the in-memory repository
//!
//! ```toml
//! [[nodes]]
//! id = 1
//! code = "LBIR100B"
//! year = 2020
//! type = "BACHELOR"
//! title = "BIR1BA"
//!
//! [[links]]
//! parent = "LBIR100B"
//! child = "LBIR101G"
//! year = 2020
//!
//! [[trees]]
//! code = "LBIR100B"
//! year = 2020
//! ```
//!
//! Without `[[relationships]]` the default table applies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::node::NodeKind;
use crate::domain::node_type::{ConstraintType, ProposalType, Quadrimester};
use crate::domain::prerequisite::Prerequisite;
use crate::domain::repository::ProgramTreeVersionRepository;
use crate::domain::{
    AuthorizedRelationship, AuthorizedRelationshipList, LinkAttributes, LinkType, Node, NodeId, NodeIdentity,
    NodeType, ProgramTreeIdentity, ProgramTreeVersion, ProgramTreeVersionIdentity,
};

use super::memory::InMemoryRepository;
use super::relationships::default_relationships;
use super::{InfraError, InfraResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipFixture {
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeFixture {
    pub id: NodeId,
    pub code: String,
    pub year: u32,
    #[serde(rename = "type")]
    pub node_type: String,
    pub title: Option<String>,
    pub credits: Option<f64>,
    pub start_year: Option<u32>,
    pub end_year: Option<u32>,
    pub constraint_type: Option<String>,
    pub min_constraint: Option<u32>,
    pub max_constraint: Option<u32>,
    #[serde(default)]
    pub version_name: String,
    pub proposal: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkFixture {
    pub parent: String,
    pub child: String,
    pub year: u32,
    /// Defaults to `year`
    pub child_year: Option<u32>,
    #[serde(default)]
    pub reference: bool,
    #[serde(default = "default_true")]
    pub is_mandatory: bool,
    #[serde(default)]
    pub access_condition: bool,
    pub block: Option<u32>,
    pub relative_credits: Option<i32>,
    #[serde(default)]
    pub comment: String,
    pub quadrimester_derogation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeFixture {
    pub code: String,
    pub year: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrerequisiteFixture {
    /// Root code of the tree giving the prerequisite its context
    pub tree: String,
    pub node: String,
    pub year: u32,
    pub expression: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionFixture {
    pub offer: String,
    pub year: u32,
    #[serde(default)]
    pub version_name: String,
    #[serde(default)]
    pub is_transition: bool,
    /// Root code of the version's tree, in the same year
    pub tree: String,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub start_year: Option<u32>,
    pub end_year: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Content of one fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub relationships: Vec<RelationshipFixture>,
    pub nodes: Vec<NodeFixture>,
    pub links: Vec<LinkFixture>,
    pub trees: Vec<TreeFixture>,
    pub prerequisites: Vec<PrerequisiteFixture>,
    pub versions: Vec<VersionFixture>,
    #[serde(skip)]
    source: PathBuf,
}

impl Fixture {
    pub fn load(path: &Path) -> InfraResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read fixture {}", path.display()), e))?;
        let mut fixture = Self::from_toml(&content).map_err(|e| match e {
            InfraError::Fixture { message, .. } => InfraError::fixture(path, message),
            other => other,
        })?;
        fixture.source = path.to_path_buf();
        Ok(fixture)
    }

    pub fn from_toml(content: &str) -> InfraResult<Self> {
        toml::from_str(content).map_err(|e| InfraError::fixture("<inline>", e.to_string()))
    }

    fn invalid(&self, message: impl Into<String>) -> InfraError {
        InfraError::fixture(&self.source, message)
    }

    pub fn authorized_relationships(&self) -> InfraResult<AuthorizedRelationshipList> {
        if self.relationships.is_empty() {
            return Ok(default_relationships());
        }
        self.relationships
            .iter()
            .map(|r| {
                Ok(AuthorizedRelationship::new(
                    self.parse::<NodeType>(&r.parent)?,
                    self.parse::<NodeType>(&r.child)?,
                    r.min,
                    r.max,
                ))
            })
            .collect::<InfraResult<Vec<_>>>()
            .map(AuthorizedRelationshipList::new)
    }

    fn parse<T>(&self, value: &str) -> InfraResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        value.parse().map_err(|e: T::Err| self.invalid(e.to_string()))
    }

    fn node(&self, fixture: &NodeFixture) -> InfraResult<Node> {
        let node_type = self.parse::<NodeType>(&fixture.node_type)?;
        let mut node = match node_type {
            NodeType::LearningUnit => Node::learning_unit(fixture.id, &fixture.code, fixture.year),
            NodeType::LearningClass => Node::learning_class(fixture.id, &fixture.code, fixture.year),
            group_type => Node::group(fixture.id, &fixture.code, fixture.year, group_type),
        };
        if let Some(title) = &fixture.title {
            node.title = title.clone();
            node.title_fr = Some(title.clone());
        }
        node.credits = fixture.credits;
        node.end_year = fixture.end_year;
        if let Some(start_year) = fixture.start_year {
            node.start_year = start_year;
        }

        let constraint_type = fixture
            .constraint_type
            .as_deref()
            .map(|value| self.parse::<ConstraintType>(value))
            .transpose()?;
        let proposal_type = fixture
            .proposal
            .as_deref()
            .map(|value| self.parse::<ProposalType>(value))
            .transpose()?;
        match &mut node.kind {
            NodeKind::Group(group) => {
                group.constraint_type = constraint_type;
                group.min_constraint = fixture.min_constraint;
                group.max_constraint = fixture.max_constraint;
                group.version_name = fixture.version_name.clone();
            }
            NodeKind::LearningUnit(unit) => unit.proposal_type = proposal_type,
            NodeKind::LearningClass => {}
        }
        Ok(node)
    }

    fn link_attributes(&self, fixture: &LinkFixture) -> InfraResult<LinkAttributes> {
        Ok(LinkAttributes {
            relative_credits: fixture.relative_credits,
            is_mandatory: fixture.is_mandatory,
            block: fixture.block,
            access_condition: fixture.access_condition,
            link_type: fixture.reference.then_some(LinkType::Reference),
            comment: fixture.comment.clone(),
            quadrimester_derogation: fixture
                .quadrimester_derogation
                .as_deref()
                .map(|value| self.parse::<Quadrimester>(value))
                .transpose()?,
            ..LinkAttributes::default()
        })
    }

    /// Builds a repository holding every entity of the fixture.
    #[instrument(skip(self), fields(source = %self.source.display()))]
    pub fn into_repository(self) -> InfraResult<InMemoryRepository> {
        let repository = InMemoryRepository::new(Arc::new(self.authorized_relationships()?));

        for node in &self.nodes {
            repository.insert_node(self.node(node)?);
        }
        for link in &self.links {
            let parent = NodeIdentity::new(&link.parent, link.year);
            let child = NodeIdentity::new(&link.child, link.child_year.unwrap_or(link.year));
            repository
                .insert_link(&parent, &child, self.link_attributes(link)?)
                .map_err(|e| self.invalid(format!("link {parent} -> {child}: {e}")))?;
        }
        for tree in &self.trees {
            repository.register_tree(ProgramTreeIdentity::new(&tree.code, tree.year));
        }
        for prerequisite in &self.prerequisites {
            let parsed = Prerequisite::parse(
                &prerequisite.expression,
                NodeIdentity::new(&prerequisite.node, prerequisite.year),
                ProgramTreeIdentity::new(&prerequisite.tree, prerequisite.year),
            )
            .map_err(|e| self.invalid(e.to_string()))?;
            repository.insert_prerequisite(parsed);
        }
        for version in &self.versions {
            let stored = ProgramTreeVersion {
                entity_identity: ProgramTreeVersionIdentity::new(
                    &version.offer,
                    version.year,
                    version.version_name.to_uppercase(),
                    version.is_transition,
                ),
                program_tree_identity: ProgramTreeIdentity::new(&version.tree, version.year),
                title_fr: version.title_fr.clone(),
                title_en: version.title_en.clone(),
                start_year: version.start_year.unwrap_or(version.year),
                end_year_of_existence: version.end_year,
            };
            ProgramTreeVersionRepository::create(&repository, &stored)?;
        }

        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            trees = self.trees.len(),
            "fixture loaded"
        );
        Ok(repository)
    }
}
