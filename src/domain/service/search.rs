use itertools::Itertools;
use tracing::instrument;

use crate::domain::error::DomainResult;
use crate::domain::identity::NodeIdentity;
use crate::domain::program_tree::{NodeIndex, ProgramTree, TreePath};
use crate::domain::repository::ProgramTreeRepository;

/// Every stored tree using `node`, with `working_tree` standing in for its stored copy.
///
/// The working tree comes first when it contains `node`.
#[instrument(level = "debug", skip(working_tree, repository), fields(tree = %working_tree.entity_id()))]
pub fn search_trees_using_node(
    working_tree: &ProgramTree,
    node: &NodeIdentity,
    repository: &dyn ProgramTreeRepository,
) -> DomainResult<Vec<ProgramTree>> {
    let working_identity = working_tree.entity_id();
    let mut trees: Vec<ProgramTree> = repository
        .search_from_children(std::slice::from_ref(node))?
        .into_iter()
        .filter(|tree| tree.entity_id() != working_identity)
        .collect();
    if working_tree.contains(node) {
        trees.insert(0, working_tree.clone());
    }
    Ok(trees)
}

/// Paths of every occurrence of `node` in `tree`.
pub fn search_node_paths(tree: &ProgramTree, node: &NodeIdentity) -> Vec<TreePath> {
    tree.find(node)
        .map(|index| tree.get_paths_from_node(index))
        .unwrap_or_default()
}

/// Closest training or mini-training above each occurrence of `index`.
///
/// Groups in between are skipped; the root is returned when no such ancestor exists.
pub fn search_indirect_parents(tree: &ProgramTree, index: NodeIndex) -> Vec<NodeIndex> {
    tree.get_paths_from_node(index)
        .iter()
        .filter_map(|path| {
            let parents = tree.get_parents(path).ok()?;
            parents
                .iter()
                .copied()
                .find(|parent| {
                    let node = tree.node(*parent);
                    node.is_training() || node.is_mini_training()
                })
                .or_else(|| parents.last().copied())
        })
        .unique()
        .collect()
}
