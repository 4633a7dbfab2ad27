use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::authorized_relationship::AuthorizedRelationshipList;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::NodeIdentity;
use crate::domain::link::LinkAttributes;
use crate::domain::node::{Node, NodeFactory};
use crate::domain::node_type::NodeType;
use crate::domain::prerequisite::Prerequisites;
use crate::domain::repository::{FieldValidationRuleProvider, NodeRepository, ProgramTreeRepository};
use crate::domain::service::GenerateNodeCode;
use crate::domain::validators::{BusinessValidator, CopyProgramTreeValidatorList};

use super::{NodeIndex, ProgramTree};

/// Creates trees that do not come from storage.
pub struct ProgramTreeBuilder<'a> {
    node_factory: &'a NodeFactory,
    field_rules: &'a dyn FieldValidationRuleProvider,
}

impl<'a> ProgramTreeBuilder<'a> {
    pub fn new(node_factory: &'a NodeFactory, field_rules: &'a dyn FieldValidationRuleProvider) -> Self {
        Self {
            node_factory,
            field_rules,
        }
    }

    /// Tree rooted at a new group, filled with its mandatory children, recursively.
    ///
    /// A type is not generated below a node of the same type. Codes of
    /// generated children are free in the tree and in `node_repository`.
    #[instrument(level = "debug", skip_all, fields(root = %root.entity_id()))]
    pub fn build_from_orphan_group_as_root(
        &self,
        root: Node,
        authorized_relationships: Arc<AuthorizedRelationshipList>,
        node_repository: &dyn NodeRepository,
    ) -> DomainResult<ProgramTree> {
        let mut tree = ProgramTree::new(root, authorized_relationships);
        let root = tree.root();
        self.apply_field_rules(tree.node_mut(root), false);
        self.generate_mandatory_children(&mut tree, root, &mut Vec::new(), node_repository)?;
        debug!(nodes = tree.len(), "tree built");
        Ok(tree)
    }

    fn generate_mandatory_children(
        &self,
        tree: &mut ProgramTree,
        parent: NodeIndex,
        lineage: &mut Vec<NodeType>,
        node_repository: &dyn NodeRepository,
    ) -> DomainResult<()> {
        let parent_type = tree.node(parent).node_type;
        lineage.push(parent_type);

        let mandatory: Vec<NodeType> = tree
            .authorized_relationships()
            .get_ordered_mandatory_children_types(parent_type)
            .into_iter()
            .filter(|child_type| child_type.is_group_or_mini_or_training() && !lineage.contains(child_type))
            .collect();
        for child_type in mandatory {
            let code = {
                let tree: &ProgramTree = tree;
                let year = tree.node(parent).year;
                GenerateNodeCode::generate_from_parent_node(tree.node(parent), child_type, |code| {
                    is_code_taken(tree, node_repository, code, year)
                })?
            };
            let mut child =
                self.node_factory
                    .generate_from_parent(tree.node(parent), child_type, code, &self.title_prefix(child_type));
            self.apply_field_rules(&mut child, false);
            let child = tree.add_child(parent, child, LinkAttributes::default())?;
            self.generate_mandatory_children(tree, child, lineage, node_repository)?;
        }

        lineage.pop();
        Ok(())
    }

    fn title_prefix(&self, node_type: NodeType) -> String {
        self.field_rules
            .get(node_type, "title_fr", false)
            .initial_value
            .unwrap_or_else(|| node_type.name().replace('_', ""))
    }

    /// Copy of the root and of its mandatory direct children only, with fresh node ids.
    ///
    /// Codes and years are kept; `override_*` replace the lifetime of every copied node.
    #[instrument(level = "debug", skip(self, from), fields(from = %from.entity_id()))]
    pub fn duplicate(
        &self,
        from: &ProgramTree,
        override_end_year_to: Option<u32>,
        override_start_year_to: Option<u32>,
    ) -> DomainResult<ProgramTree> {
        let root = self
            .node_factory
            .duplicate(from.root_node(), override_end_year_to, override_start_year_to);
        let mut tree = ProgramTree::new(root, from.shared_authorized_relationships());
        let new_root = tree.root();

        for child in mandatory_children(from, from.root()) {
            let copy = self
                .node_factory
                .duplicate(from.node(child), override_end_year_to, override_start_year_to);
            tree.add_child(new_root, copy, LinkAttributes::default())?;
        }
        Ok(tree)
    }

    /// Tree of the next year for `copy_from`.
    ///
    /// An existing next-year tree is completed with the mandatory children it
    /// lacks; otherwise the root is copied first. Other children are not carried.
    #[instrument(level = "debug", skip_all, fields(from = %copy_from.entity_id()))]
    pub fn copy_to_next_year(
        &self,
        copy_from: &ProgramTree,
        tree_repository: &dyn ProgramTreeRepository,
    ) -> DomainResult<ProgramTree> {
        CopyProgramTreeValidatorList::new(copy_from).validate()?;

        let next_identity = copy_from.entity_id().next_year();
        let mut next = match tree_repository.get(&next_identity) {
            Ok(existing) => existing,
            Err(DomainError::ProgramTreeNotFound(_)) => ProgramTree::new(
                self.node_factory.copy_to_next_year(copy_from.root_node()),
                copy_from.shared_authorized_relationships(),
            ),
            Err(err) => return Err(err),
        };

        let next_root = next.root();
        let present = next.get_children_types(next_root, false);
        for child in mandatory_children(copy_from, copy_from.root()) {
            let child = copy_from.node(child);
            if present.contains(&child.node_type) {
                continue;
            }
            let copy = self.node_factory.copy_to_next_year(child);
            next.add_child(
                next_root,
                copy,
                LinkAttributes {
                    is_mandatory: true,
                    ..LinkAttributes::default()
                },
            )?;
        }
        debug!(to = %next.entity_id(), "tree copied to next year");
        Ok(next)
    }

    /// Copy of `from` for a specific version: every node gets a new code and
    /// groups carry `version_name`.
    ///
    /// Field rules for versions give the initial credits, constraints and remarks.
    #[instrument(level = "debug", skip(self, from, node_repository), fields(from = %from.entity_id()))]
    pub fn copy_to_specific_version(
        &self,
        from: &ProgramTree,
        version_name: &str,
        override_end_year_to: Option<u32>,
        override_start_year_to: Option<u32>,
        node_repository: &dyn NodeRepository,
    ) -> DomainResult<ProgramTree> {
        let mut tree = self.duplicate(from, override_end_year_to, override_start_year_to)?;
        let nodes = tree.get_all_nodes(None);
        for index in nodes {
            let year = tree.node(index).year;
            let code = GenerateNodeCode::generate_alternative(tree.node(index), |code| {
                is_code_taken(&tree, node_repository, code, year)
            })?;
            tree.rename_node(index, code);

            let node = tree.node_mut(index);
            if let Some(group) = node.group_attributes_mut() {
                group.version_name = version_name.to_string();
            }
            self.apply_field_rules(node, true);
        }
        let prerequisites = Prerequisites::new(tree.entity_id());
        tree.set_prerequisites(prerequisites);
        debug!(to = %tree.entity_id(), version_name, "specific version tree built");
        Ok(tree)
    }

    fn apply_field_rules(&self, node: &mut Node, is_version: bool) {
        let node_type = node.node_type;
        let initial = |field: &str| self.field_rules.get(node_type, field, is_version).initial_value;

        if let Some(credits) = initial("credits").and_then(|value| value.parse().ok()) {
            node.credits = Some(credits);
        }
        let constraint_type = initial("constraint_type").and_then(|value| value.parse().ok());
        let min_constraint = initial("min_constraint").and_then(|value| value.parse().ok());
        let max_constraint = initial("max_constraint").and_then(|value| value.parse().ok());
        let remark_fr = initial("remark_fr");
        let remark_en = initial("remark_en");
        if let Some(group) = node.group_attributes_mut() {
            group.constraint_type = constraint_type.or(group.constraint_type);
            group.min_constraint = min_constraint.or(group.min_constraint);
            group.max_constraint = max_constraint.or(group.max_constraint);
            group.remark_fr = remark_fr.or(group.remark_fr.take());
            group.remark_en = remark_en.or(group.remark_en.take());
        }
    }
}

/// Direct children of `parent` whose type is mandatory under it, in mandatory type order.
fn mandatory_children(tree: &ProgramTree, parent: NodeIndex) -> Vec<NodeIndex> {
    let mandatory_types = tree
        .authorized_relationships()
        .get_ordered_mandatory_children_types(tree.node(parent).node_type);
    mandatory_types
        .iter()
        .flat_map(|node_type| {
            tree.node(parent)
                .children
                .iter()
                .map(|link| link.child)
                .filter(move |child| tree.node(*child).node_type == *node_type)
        })
        .collect()
}

fn is_code_taken(
    tree: &ProgramTree,
    node_repository: &dyn NodeRepository,
    code: &str,
    year: u32,
) -> DomainResult<bool> {
    let identity = NodeIdentity::new(code, year);
    if tree.contains(&identity) {
        return Ok(true);
    }
    Ok(!node_repository.search(&[identity])?.is_empty())
}
