//! Prerequisite rules: expression grammar, known codes, and detaching
//! learning units involved in prerequisites.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::domain::error::{BusinessError, DomainResult};
use crate::domain::identity::NodeIdentity;
use crate::domain::prerequisite::{extract_codes, is_valid_expression, Language};
use crate::domain::program_tree::{NodeIndex, ProgramTree};
use crate::domain::repository::ProgramTreeRepository;
use crate::domain::service::search_trees_using_node;

use super::{collect_into, fail, fail_all, BusinessValidator};

pub struct PrerequisiteExpressionSyntaxValidator<'a> {
    expression: &'a str,
}

impl<'a> PrerequisiteExpressionSyntaxValidator<'a> {
    pub fn new(expression: &'a str) -> Self {
        Self { expression }
    }
}

impl BusinessValidator for PrerequisiteExpressionSyntaxValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !is_valid_expression(&self.expression.to_uppercase()) {
            return fail(BusinessError::PrerequisiteSyntaxInvalid {
                expression: self.expression.to_string(),
            });
        }
        Ok(())
    }
}

/// Every code must be a learning unit the owner may depend on, other than itself.
pub struct PrerequisiteItemsValidator<'a> {
    expression: &'a str,
    tree: &'a ProgramTree,
    node: NodeIndex,
}

impl<'a> PrerequisiteItemsValidator<'a> {
    pub fn new(expression: &'a str, tree: &'a ProgramTree, node: NodeIndex) -> Self {
        Self {
            expression,
            tree,
            node,
        }
    }
}

impl BusinessValidator for PrerequisiteItemsValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let codes = extract_codes(self.expression);
        let owner = &self.tree.node(self.node).code;
        let permitted = self.tree.get_codes_permitted_as_prerequisite(self.node);

        let mut errors = Vec::new();
        let unknown: Vec<String> = codes
            .iter()
            .filter(|code| *code != owner && !permitted.contains(*code))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            errors.push(BusinessError::PrerequisiteUnknownCode { codes: unknown });
        }
        if codes.contains(owner) {
            errors.push(BusinessError::PrerequisiteOnSelf {
                code: owner.clone(),
            });
        }
        fail_all(errors)
    }
}

/// Learning units leaving `tree` must not be required by learning units that stay.
pub struct IsPrerequisiteValidator<'a> {
    tree: &'a ProgramTree,
    removed: &'a BTreeSet<NodeIdentity>,
}

impl<'a> IsPrerequisiteValidator<'a> {
    pub fn new(tree: &'a ProgramTree, removed: &'a BTreeSet<NodeIdentity>) -> Self {
        Self { tree, removed }
    }
}

impl BusinessValidator for IsPrerequisiteValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let prerequisites = self.tree.prerequisites();
        let offenders: Vec<String> = self
            .removed
            .iter()
            .filter(|learning_unit| {
                prerequisites
                    .nodes_having_prerequisite_on(&learning_unit.code)
                    .into_iter()
                    .any(|owner| !self.removed.contains(owner))
            })
            .map(|learning_unit| learning_unit.code.clone())
            .collect();
        if offenders.is_empty() {
            return Ok(());
        }
        fail(BusinessError::CannotDetachLearningUnitsWhoArePrerequisite {
            tree: self.tree.entity_id(),
            learning_units: offenders,
        })
    }
}

/// Learning units leaving `tree` must not depend on learning units that stay.
pub struct HasPrerequisiteValidator<'a> {
    tree: &'a ProgramTree,
    removed: &'a BTreeSet<NodeIdentity>,
}

impl<'a> HasPrerequisiteValidator<'a> {
    pub fn new(tree: &'a ProgramTree, removed: &'a BTreeSet<NodeIdentity>) -> Self {
        Self { tree, removed }
    }
}

impl BusinessValidator for HasPrerequisiteValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let removed_codes: BTreeSet<&str> = self.removed.iter().map(|id| id.code.as_str()).collect();
        let offenders: Vec<String> = self
            .removed
            .iter()
            .filter(|learning_unit| {
                self.tree.prerequisites().get(learning_unit).is_some_and(|prerequisite| {
                    prerequisite
                        .get_all_prerequisite_items()
                        .iter()
                        .any(|item| !removed_codes.contains(item.code.as_str()))
                })
            })
            .map(|learning_unit| learning_unit.code.clone())
            .collect();
        if offenders.is_empty() {
            return Ok(());
        }
        fail(BusinessError::CannotDetachLearningUnitsWhoHavePrerequisite {
            tree: self.tree.entity_id(),
            learning_units: offenders,
        })
    }
}

/// Runs the two prerequisite checks on every tree using the parent of the detached link.
pub struct IsHasPrerequisiteForAllTreesValidator<'a> {
    working_tree: &'a ProgramTree,
    parent: NodeIndex,
    child: NodeIndex,
    tree_repository: &'a dyn ProgramTreeRepository,
}

impl<'a> IsHasPrerequisiteForAllTreesValidator<'a> {
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

    fn removed_learning_units(tree: &ProgramTree, after: &ProgramTree) -> BTreeSet<NodeIdentity> {
        tree.get_all_learning_unit_nodes()
            .into_iter()
            .map(|index| tree.node(index).entity_id())
            .filter(|identity| !after.contains(identity))
            .collect()
    }
}

impl BusinessValidator for IsHasPrerequisiteForAllTreesValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let parent = self.working_tree.node(self.parent).entity_id();
        let child = self.working_tree.node(self.child).entity_id();
        let trees = search_trees_using_node(self.working_tree, &parent, self.tree_repository)?;

        let mut errors = Vec::new();
        for tree in &trees {
            let after = tree.without_link(&parent, &child);
            let removed = Self::removed_learning_units(tree, &after);
            if removed.is_empty() {
                continue;
            }
            collect_into(IsPrerequisiteValidator::new(tree, &removed).validate(), &mut errors)?;
            collect_into(HasPrerequisiteValidator::new(tree, &removed).validate(), &mut errors)?;
        }
        fail_all(errors.into_iter().unique().collect())
    }
}

/// Item rules of every prerequisite already stored in the tree.
pub struct TreePrerequisitesValidator<'a> {
    tree: &'a ProgramTree,
}

impl<'a> TreePrerequisitesValidator<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self { tree }
    }
}

impl BusinessValidator for TreePrerequisitesValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        for prerequisite in self.tree.prerequisites().iter() {
            let Some(owner) = self.tree.find(&prerequisite.node_having_prerequisites) else {
                continue;
            };
            let expression = prerequisite.to_expression(Language::Fr);
            collect_into(
                PrerequisiteItemsValidator::new(&expression, self.tree, owner).validate(),
                &mut errors,
            )?;
        }
        fail_all(errors)
    }
}
