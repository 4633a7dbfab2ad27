//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the repository traits of the domain layer
//! but are themselves concrete structs, not traits.

mod postponement;
mod program_tree;
mod version;

pub use postponement::PostponementService;
pub use program_tree::ProgramTreeService;
pub use version::ProgramTreeVersionService;
