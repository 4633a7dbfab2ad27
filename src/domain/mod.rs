//! Domain layer: program trees, versions and the business rules guarding them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Storage is reached only through the traits of [`repository`].

pub mod authorized_relationship;
pub mod command;
pub mod error;
pub mod identity;
pub mod link;
pub mod node;
pub mod node_type;
pub mod prerequisite;
pub mod program_tree;
pub mod program_tree_version;
pub mod repository;
pub mod service;
pub mod validators;

pub use authorized_relationship::{AuthorizedRelationship, AuthorizedRelationshipList};
pub use command::{LinkUpdate, PasteCommand};
pub use error::{BusinessError, BusinessErrors, DomainError, DomainResult};
pub use identity::{LinkIdentity, NodeIdentity, ProgramTreeIdentity, ProgramTreeVersionIdentity};
pub use link::{Link, LinkAttributes};
pub use node::{Node, NodeFactory, NodeId};
pub use node_type::{GroupType, LinkType, MiniTrainingType, NodeType, TrainingType};
pub use program_tree::{EditionContext, NodeIndex, ProgramTree, ProgramTreeBuilder, TreePath};
pub use program_tree_version::{NewVersionAttributes, ProgramTreeVersion, ProgramTreeVersionBuilder};
