//! Invariants between a 2M program, its finalities and its options.

use std::collections::BTreeSet;

use crate::domain::error::{BusinessError, DomainResult};
use crate::domain::identity::NodeIdentity;
use crate::domain::link::LinkAttributes;
use crate::domain::node_type::LinkType;
use crate::domain::program_tree::{NodeIndex, ProgramTree};
use crate::domain::repository::ProgramTreeRepository;
use crate::domain::service::search_trees_using_node;

use super::{collect_into, fail, fail_all, BusinessValidator};

fn codes(tree: &ProgramTree, indices: impl IntoIterator<Item = NodeIndex>) -> Vec<String> {
    let codes: BTreeSet<String> = indices
        .into_iter()
        .map(|index| tree.node(index).code.clone())
        .collect();
    codes.into_iter().collect()
}

fn master_2m_trees_using(
    working_tree: &ProgramTree,
    node: &NodeIdentity,
    repository: &dyn ProgramTreeRepository,
) -> DomainResult<Vec<ProgramTree>> {
    Ok(search_trees_using_node(working_tree, node, repository)?
        .into_iter()
        .filter(ProgramTree::is_master_2m)
        .collect())
}

/// Finalities of a 2M must not end after the 2M itself.
pub struct Master2MEndDateValidator<'a> {
    tree: &'a ProgramTree,
}

impl<'a> Master2MEndDateValidator<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self { tree }
    }
}

impl BusinessValidator for Master2MEndDateValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !self.tree.is_master_2m() {
            return Ok(());
        }
        let root = self.tree.root_node();
        let offenders = codes(
            self.tree,
            self.tree
                .get_all_finalities()
                .into_iter()
                .filter(|index| *index != self.tree.root())
                .filter(|index| self.tree.node(*index).ends_after(root.end_year)),
        );
        if offenders.is_empty() {
            return Ok(());
        }
        fail(BusinessError::Program2MEndDateShouldBeGreaterOrEqualThanItsFinalities {
            program: root.code.clone(),
            finalities: offenders,
        })
    }
}

/// Finalities pasted into a 2M must not end after it.
pub struct AttachFinalityEndDateValidator<'a> {
    tree_2m: &'a ProgramTree,
    tree_to_paste: &'a ProgramTree,
}

impl<'a> AttachFinalityEndDateValidator<'a> {
    pub fn new(tree_2m: &'a ProgramTree, tree_to_paste: &'a ProgramTree) -> Self {
        Self {
            tree_2m,
            tree_to_paste,
        }
    }
}

impl BusinessValidator for AttachFinalityEndDateValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let program = self.tree_2m.root_node();
        let offenders = codes(
            self.tree_to_paste,
            self.tree_to_paste
                .get_all_finalities()
                .into_iter()
                .filter(|index| self.tree_to_paste.node(*index).ends_after(program.end_year)),
        );
        if offenders.is_empty() {
            return Ok(());
        }
        fail(BusinessError::CannotAttachFinalitiesWithGreaterEndDateThanProgram2M {
            program: program.code.clone(),
            finalities: offenders,
        })
    }
}

/// Every option used in a finality must appear in the 2M option list.
pub struct AttachOptionsValidator<'a> {
    tree_2m: &'a ProgramTree,
}

impl<'a> AttachOptionsValidator<'a> {
    pub fn new(tree_2m: &'a ProgramTree) -> Self {
        Self { tree_2m }
    }
}

impl BusinessValidator for AttachOptionsValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !self.tree_2m.is_master_2m() {
            return Ok(());
        }
        let option_list: BTreeSet<NodeIndex> = self.tree_2m.get_2m_option_list().into_iter().collect();
        let missing = codes(
            self.tree_2m,
            self.tree_2m
                .get_all_finalities()
                .into_iter()
                .flat_map(|finality| self.tree_2m.get_option_list(finality))
                .filter(|option| !option_list.contains(option)),
        );
        if missing.is_empty() {
            return Ok(());
        }
        fail(BusinessError::CannotAttachOptionIfNotPresentIn2MOptionList {
            program: self.tree_2m.root_node().code.clone(),
            options: missing,
        })
    }
}

/// Runs the finality and option checks on every 2M the paste would modify.
pub struct ValidateFinalitiesEndDateAndOptions<'a> {
    working_tree: &'a ProgramTree,
    parent: NodeIndex,
    tree_to_paste: &'a ProgramTree,
    link_type: Option<LinkType>,
    tree_repository: &'a dyn ProgramTreeRepository,
}

impl<'a> ValidateFinalitiesEndDateAndOptions<'a> {
    pub fn new(
        working_tree: &'a ProgramTree,
        parent: NodeIndex,
        tree_to_paste: &'a ProgramTree,
        link_type: Option<LinkType>,
        tree_repository: &'a dyn ProgramTreeRepository,
    ) -> Self {
        Self {
            working_tree,
            parent,
            tree_to_paste,
            link_type,
            tree_repository,
        }
    }
}

impl BusinessValidator for ValidateFinalitiesEndDateAndOptions<'_> {
    fn validate(&self) -> DomainResult<()> {
        let pasted = self.tree_to_paste;
        if pasted.root_node().is_learning_unit() {
            return Ok(());
        }
        let has_finalities = !pasted.get_all_finalities().is_empty();
        let has_options = pasted.root_node().is_option() || !pasted.get_option_list(pasted.root()).is_empty();
        if !has_finalities && !has_options {
            return Ok(());
        }

        let parent = self.working_tree.node(self.parent).entity_id();
        let attributes = LinkAttributes {
            link_type: self.link_type,
            ..LinkAttributes::default()
        };
        let mut errors = Vec::new();
        for tree_2m in master_2m_trees_using(self.working_tree, &parent, self.tree_repository)? {
            if has_finalities {
                collect_into(
                    AttachFinalityEndDateValidator::new(&tree_2m, pasted).validate(),
                    &mut errors,
                )?;
            }
            let simulated = tree_2m.with_pasted(&parent, pasted, attributes.clone())?;
            collect_into(AttachOptionsValidator::new(&simulated).validate(), &mut errors)?;
        }
        fail_all(errors)
    }
}

/// Options leaving a 2M option list must not be used by its finalities anymore.
pub struct DetachOptionValidator<'a> {
    working_tree: &'a ProgramTree,
    parent: NodeIndex,
    child: NodeIndex,
    tree_repository: &'a dyn ProgramTreeRepository,
}

impl<'a> DetachOptionValidator<'a> {
    pub fn new(
        working_tree: &'a ProgramTree,
        parent: NodeIndex,
        child: NodeIndex,
        tree_repository: &'a dyn ProgramTreeRepository,
    ) -> Self {
        Self {
            working_tree,
            parent,
            child,
            tree_repository,
        }
    }

    fn options_to_detach(&self) -> BTreeSet<NodeIdentity> {
        let tree = self.working_tree;
        let mut options: BTreeSet<NodeIdentity> = tree
            .get_option_list(self.child)
            .into_iter()
            .map(|index| tree.node(index).entity_id())
            .collect();
        if tree.node(self.child).is_option() {
            options.insert(tree.node(self.child).entity_id());
        }
        options
    }
}

impl BusinessValidator for DetachOptionValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let options_to_detach = self.options_to_detach();
        if options_to_detach.is_empty() {
            return Ok(());
        }
        let parent = self.working_tree.node(self.parent).entity_id();
        let child = self.working_tree.node(self.child).entity_id();

        let mut errors = Vec::new();
        for tree_2m in master_2m_trees_using(self.working_tree, &parent, self.tree_repository)? {
            let after = tree_2m.without_link(&parent, &child);
            let remaining: BTreeSet<NodeIdentity> = after
                .get_2m_option_list()
                .into_iter()
                .map(|index| after.node(index).entity_id())
                .collect();
            let leaving: BTreeSet<&NodeIdentity> = options_to_detach
                .iter()
                .filter(|option| !remaining.contains(*option))
                .collect();
            if leaving.is_empty() {
                continue;
            }
            for finality in after.get_all_finalities() {
                let used: Vec<String> = after
                    .get_option_list(finality)
                    .into_iter()
                    .map(|index| after.node(index).entity_id())
                    .filter(|option| leaving.contains(option))
                    .map(|option| option.code)
                    .collect();
                if !used.is_empty() {
                    errors.push(BusinessError::CannotDetachOptionUsedInFinality {
                        finality: after.node(finality).code.clone(),
                        options: used,
                    });
                }
            }
        }
        fail_all(errors)
    }
}

/// End year changes of a 2M or of one of its finalities keep finalities within the 2M.
pub struct CheckEndDateBetweenFinalitiesAndMasters2M<'a> {
    tree: &'a ProgramTree,
    tree_repository: &'a dyn ProgramTreeRepository,
}

impl<'a> CheckEndDateBetweenFinalitiesAndMasters2M<'a> {
    pub fn new(tree: &'a ProgramTree, tree_repository: &'a dyn ProgramTreeRepository) -> Self {
        Self {
            tree,
            tree_repository,
        }
    }
}

impl BusinessValidator for CheckEndDateBetweenFinalitiesAndMasters2M<'_> {
    fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        collect_into(Master2MEndDateValidator::new(self.tree).validate(), &mut errors)?;

        let root = self.tree.root_node();
        if root.is_finality() {
            let own_identity = self.tree.entity_id();
            for tree_2m in master_2m_trees_using(self.tree, &root.entity_id(), self.tree_repository)?
                .into_iter()
                .filter(|tree| tree.entity_id() != own_identity)
            {
                let program = tree_2m.root_node();
                if root.ends_after(program.end_year) {
                    errors.push(BusinessError::CannotAttachFinalitiesWithGreaterEndDateThanProgram2M {
                        program: program.code.clone(),
                        finalities: vec![root.code.clone()],
                    });
                }
            }
        }
        fail_all(errors)
    }
}
