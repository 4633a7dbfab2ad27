//! Infrastructure layer: storage implementations, reference data and DI container
//!
//! This layer implements the repository traits of the domain and wires up services.

pub mod di;
pub mod error;
pub mod fixture;
pub mod memory;
pub mod relationships;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
pub use fixture::Fixture;
pub use memory::InMemoryRepository;
pub use relationships::{default_relationships, ConfigFieldValidationRules, StaticAuthorizedRelationships};
