use crate::domain::program_tree::ProgramTree;

/// Last year a tree is copied to when postponed.
pub struct CalculateEndPostponement;

impl CalculateEndPostponement {
    /// The end of the tree, capped at `max_postponement_year`.
    pub fn calculate_end_postponement_year(tree: &ProgramTree, max_postponement_year: u32) -> u32 {
        tree.root_node()
            .end_year
            .map_or(max_postponement_year, |end_year| end_year.min(max_postponement_year))
    }
}
