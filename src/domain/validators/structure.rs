//! Structural rules of a link: leaves, duplicates, years, cycles, link types,
//! blocks and relative credits.

use crate::domain::error::{BusinessError, DomainResult};
use crate::domain::link::is_valid_block;
use crate::domain::node::Node;
use crate::domain::node_type::LinkType;
use crate::domain::program_tree::{NodeIndex, ProgramTree, TreePath};

use super::{collect_into, fail, fail_all, BusinessValidator};

pub struct PathValidator<'a> {
    path: &'a str,
}

impl<'a> PathValidator<'a> {
    pub fn new(path: &'a str) -> Self {
        Self { path }
    }
}

impl BusinessValidator for PathValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        self.path.parse::<TreePath>()?;
        Ok(())
    }
}

pub struct ParentIsNotLeafValidator<'a> {
    parent: &'a Node,
}

impl<'a> ParentIsNotLeafValidator<'a> {
    pub fn new(parent: &'a Node) -> Self {
        Self { parent }
    }
}

impl BusinessValidator for ParentIsNotLeafValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if self.parent.is_learning_unit() {
            return fail(BusinessError::CannotPasteToLearningUnit {
                parent: self.parent.entity_id(),
            });
        }
        Ok(())
    }
}

pub struct NodeDuplicationValidator<'a> {
    tree: &'a ProgramTree,
    parent: NodeIndex,
    node_to_paste: &'a Node,
}

impl<'a> NodeDuplicationValidator<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, node_to_paste: &'a Node) -> Self {
        Self {
            tree,
            parent,
            node_to_paste,
        }
    }
}

impl BusinessValidator for NodeDuplicationValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let child = self.node_to_paste.entity_id();
        if self.tree.get_direct_child(self.parent, &child).is_some() {
            return fail(BusinessError::SameChildToParent {
                parent: self.tree.node(self.parent).entity_id(),
                child,
            });
        }
        Ok(())
    }
}

/// Learning units may be reused across years; groups may not.
pub struct ParentChildSameAcademicYearValidator<'a> {
    parent: &'a Node,
    child: &'a Node,
}

impl<'a> ParentChildSameAcademicYearValidator<'a> {
    pub fn new(parent: &'a Node, child: &'a Node) -> Self {
        Self { parent, child }
    }
}

impl BusinessValidator for ParentChildSameAcademicYearValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if !self.child.is_learning_unit() && self.parent.year != self.child.year {
            return fail(BusinessError::ParentAndChildDifferentAcademicYear {
                parent: self.parent.entity_id(),
                child: self.child.entity_id(),
            });
        }
        Ok(())
    }
}

pub struct InfiniteRecursivityLinkValidator<'a> {
    parent: &'a Node,
    node_to_add: &'a Node,
}

impl<'a> InfiniteRecursivityLinkValidator<'a> {
    pub fn new(parent: &'a Node, node_to_add: &'a Node) -> Self {
        Self {
            parent,
            node_to_add,
        }
    }
}

impl BusinessValidator for InfiniteRecursivityLinkValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if self.parent.entity_id() == self.node_to_add.entity_id() {
            return fail(BusinessError::SelfPaste {
                node: self.node_to_add.entity_id(),
            });
        }
        Ok(())
    }
}

/// The pasted subtree must not contain the target or any of its ancestors.
pub struct InfiniteRecursivityTreeValidator<'a> {
    tree: &'a ProgramTree,
    parent: NodeIndex,
    tree_to_paste: &'a ProgramTree,
}

impl<'a> InfiniteRecursivityTreeValidator<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, tree_to_paste: &'a ProgramTree) -> Self {
        Self {
            tree,
            parent,
            tree_to_paste,
        }
    }
}

impl BusinessValidator for InfiniteRecursivityTreeValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let pasted = self.tree_to_paste.root_node().entity_id();
        if pasted == self.tree.node(self.parent).entity_id() {
            // reported as a self paste
            return Ok(());
        }
        if self.tree.creates_cycle(self.parent, self.tree_to_paste) {
            return fail(BusinessError::InfiniteRecursivity { node: pasted });
        }
        Ok(())
    }
}

pub struct AuthorizedLinkTypeValidator<'a> {
    parent: &'a Node,
    child: &'a Node,
    link_type: Option<LinkType>,
}

impl<'a> AuthorizedLinkTypeValidator<'a> {
    pub fn new(parent: &'a Node, child: &'a Node, link_type: Option<LinkType>) -> Self {
        Self {
            parent,
            child,
            link_type,
        }
    }
}

impl BusinessValidator for AuthorizedLinkTypeValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let is_reference = self.link_type == Some(LinkType::Reference);
        let parent_type = self.parent.node_type;
        if is_reference && self.child.is_learning_unit() {
            return fail(BusinessError::ReferenceLinkNotAllowedWithLearningUnit {
                child: self.child.entity_id(),
            });
        }
        if is_reference
            && (parent_type.is_option_list_choice() || parent_type.is_finality_list_choice())
        {
            return fail(BusinessError::ReferenceLinkNotAllowed {
                parent: self.parent.entity_id(),
                child: self.child.entity_id(),
            });
        }
        if !is_reference && self.parent.is_minor_major_list_choice() && self.child.is_minor_or_deepening() {
            return fail(BusinessError::LinkShouldBeReference {
                parent: self.parent.entity_id(),
                child: self.child.entity_id(),
            });
        }
        Ok(())
    }
}

pub struct InvalidBlockValidator {
    block: Option<u32>,
}

impl InvalidBlockValidator {
    pub fn new(block: Option<u32>) -> Self {
        Self { block }
    }
}

impl BusinessValidator for InvalidBlockValidator {
    fn validate(&self) -> DomainResult<()> {
        match self.block {
            Some(block) if !is_valid_block(block) => fail(BusinessError::InvalidBlock { block }),
            _ => Ok(()),
        }
    }
}

pub struct RelativeCreditsValidator {
    relative_credits: Option<i32>,
}

impl RelativeCreditsValidator {
    pub fn new(relative_credits: Option<i32>) -> Self {
        Self { relative_credits }
    }
}

impl BusinessValidator for RelativeCreditsValidator {
    fn validate(&self) -> DomainResult<()> {
        match self.relative_credits {
            Some(value) if value < 0 => {
                fail(BusinessError::RelativeCreditShouldBeGreaterOrEqualsThanZero { value })
            }
            Some(value) if value > 999 => {
                fail(BusinessError::RelativeCreditShouldBeLowerOrEqualThan999 { value })
            }
            _ => Ok(()),
        }
    }
}

pub struct MinimumEditableYearValidator {
    year: u32,
    limit: u32,
}

impl MinimumEditableYearValidator {
    pub fn new(tree: &ProgramTree, limit: u32) -> Self {
        Self {
            year: tree.root_node().year,
            limit,
        }
    }
}

impl BusinessValidator for MinimumEditableYearValidator {
    fn validate(&self) -> DomainResult<()> {
        if self.year < self.limit {
            return fail(BusinessError::MinimumEditableYear {
                year: self.year,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

pub struct DetachRootForbiddenValidator<'a> {
    tree: &'a ProgramTree,
    path: &'a TreePath,
}

impl<'a> DetachRootForbiddenValidator<'a> {
    pub fn new(tree: &'a ProgramTree, path: &'a TreePath) -> Self {
        Self { tree, path }
    }
}

impl BusinessValidator for DetachRootForbiddenValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        if self.path.is_root() {
            return fail(BusinessError::DetachRootForbidden {
                node: self.tree.root_node().entity_id(),
            });
        }
        Ok(())
    }
}

/// Link rules of every link already in the tree.
pub struct TreeLinksValidator<'a> {
    tree: &'a ProgramTree,
}

impl<'a> TreeLinksValidator<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self { tree }
    }
}

impl BusinessValidator for TreeLinksValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        for link in self.tree.get_all_links() {
            let parent = self.tree.node(link.parent);
            let child = self.tree.node(link.child);
            let attributes = &link.attributes;
            collect_into(
                AuthorizedLinkTypeValidator::new(parent, child, attributes.link_type).validate(),
                &mut errors,
            )?;
            collect_into(InvalidBlockValidator::new(attributes.block).validate(), &mut errors)?;
            collect_into(
                RelativeCreditsValidator::new(attributes.relative_credits).validate(),
                &mut errors,
            )?;
        }
        fail_all(errors)
    }
}
