//! Domain services: computations spanning several trees or reaching repositories.

mod generate_node_code;
mod identity_search;
mod postponement;
mod search;

pub use generate_node_code::GenerateNodeCode;
pub use identity_search::{NodeIdentitySearch, ProgramTreeIdentitySearch, ProgramTreeVersionIdentitySearch};
pub use postponement::CalculateEndPostponement;
pub use search::{search_indirect_parents, search_node_paths, search_trees_using_node};
