use tracing::{debug, instrument};

use crate::domain::command::{LinkUpdate, PasteCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::{LinkIdentity, NodeIdentity};
use crate::domain::link::Link;
use crate::domain::node_type::LinkType;
use crate::domain::prerequisite::Prerequisite;
use crate::domain::repository::{ProgramTreeRepository, ProgramTreeVersionRepository};
use crate::domain::validators::{
    BusinessValidator, DetachNodeValidatorList, DetachRootForbiddenValidator, PasteNodeValidatorList,
    PathValidator, UpdateLinkValidatorList, UpdatePrerequisiteValidatorList,
};

use super::{NodeIndex, ProgramTree, TreePath, PATH_SEPARATOR};

/// What the validators of an edition need besides the working tree.
#[derive(Clone, Copy)]
pub struct EditionContext<'a> {
    pub tree_repository: &'a dyn ProgramTreeRepository,
    pub version_repository: &'a dyn ProgramTreeVersionRepository,
    pub year_limit_edg_modification: u32,
}

impl ProgramTree {
    /// Attaches `node_to_paste` at the end of the children of the node at
    /// `command.path_where_to_paste`.
    ///
    /// Minors and deepenings pasted into a minor or major list are always
    /// attached by reference.
    #[instrument(
        level = "debug",
        skip_all,
        fields(tree = %self.entity_id(), path = %command.path_where_to_paste, node = %node_to_paste.entity_id())
    )]
    pub fn paste_node(
        &mut self,
        node_to_paste: &ProgramTree,
        command: &PasteCommand,
        context: &EditionContext<'_>,
    ) -> DomainResult<Link> {
        PathValidator::new(&command.path_where_to_paste).validate()?;
        let path: TreePath = command.path_where_to_paste.parse()?;
        let parent = self.get_node(&path)?;

        let link_type = if self.node(parent).is_minor_major_list_choice()
            && node_to_paste.root_node().is_minor_or_deepening()
        {
            Some(LinkType::Reference)
        } else {
            command.link_type
        };

        PasteNodeValidatorList::new(self, parent, node_to_paste, command, link_type, context).validate()?;

        let child = self.import_subtree(node_to_paste, node_to_paste.root());
        let link = self.add_link(parent, child, command.link_attributes(link_type))?.clone();
        debug!(order = link.order, "node pasted");
        Ok(link)
    }

    /// Removes the link ending at `path_to_detach`.
    ///
    /// Nodes no longer reachable leave the tree with their prerequisites.
    #[instrument(level = "debug", skip(self, context), fields(tree = %self.entity_id()))]
    pub fn detach_node(&mut self, path_to_detach: &str, context: &EditionContext<'_>) -> DomainResult<LinkIdentity> {
        PathValidator::new(path_to_detach).validate()?;
        let path: TreePath = path_to_detach.parse()?;
        let child = self.get_node(&path)?;
        DetachRootForbiddenValidator::new(self, &path).validate()?;

        let parent_path = path.parent().ok_or_else(|| DomainError::NodeNotFound {
            path: path_to_detach.to_string(),
        })?;
        let parent = self.get_node(&parent_path)?;
        DetachNodeValidatorList::new(self, parent, child, context).validate()?;

        let identity = LinkIdentity::new(&self.node(parent).entity_id(), &self.node(child).entity_id());
        self.remove_link(parent, child);
        self.prune_unreachable();
        self.drop_orphan_prerequisites();
        debug!(link = %identity, "node detached");
        Ok(identity)
    }

    fn drop_orphan_prerequisites(&mut self) {
        let orphans: Vec<NodeIdentity> = self
            .prerequisites()
            .iter()
            .map(|prerequisite| prerequisite.node_having_prerequisites.clone())
            .filter(|owner| !self.contains(owner))
            .collect();
        for owner in orphans {
            self.prerequisites_mut().remove(&owner);
        }
    }

    /// Updates the link from the node at `parent_path` to its direct child `child`.
    ///
    /// The tree is left untouched when validation fails.
    #[instrument(level = "debug", skip(self, update), fields(tree = %self.entity_id()))]
    pub fn update_link(
        &mut self,
        parent_path: &TreePath,
        child: &NodeIdentity,
        update: &LinkUpdate,
    ) -> DomainResult<Link> {
        let not_found = || DomainError::NodeNotFound {
            path: format!("{parent_path}{PATH_SEPARATOR}{child}"),
        };
        let parent = self.get_node(parent_path)?;
        let child = self.get_direct_child(parent, child).ok_or_else(not_found)?;

        let mut candidate = self.clone();
        if let Some(link) = candidate.link_mut(parent, child) {
            update.apply_to(&mut link.attributes);
        }
        UpdateLinkValidatorList::new(&candidate, parent, child).validate()?;

        *self = candidate;
        self.get_link(parent, child).cloned().ok_or_else(not_found)
    }

    /// Moves the link `parent -> child` one place up; no-op when already first.
    pub fn up_link(&mut self, parent: NodeIndex, child: NodeIndex) -> DomainResult<Link> {
        let position = self.link_position(parent, child)?;
        if position > 0 {
            self.swap_links(parent, position - 1, position);
        }
        self.moved_link(parent, child)
    }

    /// Moves the link `parent -> child` one place down; no-op when already last.
    pub fn down_link(&mut self, parent: NodeIndex, child: NodeIndex) -> DomainResult<Link> {
        let position = self.link_position(parent, child)?;
        if position + 1 < self.node(parent).children.len() {
            self.swap_links(parent, position, position + 1);
        }
        self.moved_link(parent, child)
    }

    fn link_position(&self, parent: NodeIndex, child: NodeIndex) -> DomainResult<usize> {
        self.get(parent)
            .and_then(|node| node.children.iter().position(|link| link.child == child))
            .ok_or_else(|| self.missing_link(parent, child))
    }

    fn swap_links(&mut self, parent: NodeIndex, first: usize, second: usize) {
        let children = &mut self.node_mut(parent).children;
        children.swap(first, second);
        for (order, link) in children.iter_mut().enumerate() {
            link.order = order;
        }
    }

    fn moved_link(&self, parent: NodeIndex, child: NodeIndex) -> DomainResult<Link> {
        self.get_link(parent, child)
            .cloned()
            .ok_or_else(|| self.missing_link(parent, child))
    }

    fn missing_link(&self, parent: NodeIndex, child: NodeIndex) -> DomainError {
        let describe = |index| {
            self.get(index)
                .map_or_else(|| "?".to_string(), |node| node.entity_id().to_string())
        };
        DomainError::NodeNotFound {
            path: format!("{} -> {}", describe(parent), describe(child)),
        }
    }

    /// Replaces the prerequisite of the learning unit at `node`; an empty
    /// expression removes it.
    #[instrument(level = "debug", skip(self), fields(tree = %self.entity_id()))]
    pub fn set_prerequisite(&mut self, expression: &str, node: NodeIndex) -> DomainResult<()> {
        let owner = self.node(node);
        if !owner.is_learning_unit() {
            return Err(DomainError::NodeNotFound {
                path: format!("learning unit {}", owner.entity_id()),
            });
        }
        UpdatePrerequisiteValidatorList::new(expression, self, node).validate()?;

        let prerequisite = Prerequisite::parse(expression, self.node(node).entity_id(), self.entity_id())?;
        self.prerequisites_mut().set(prerequisite);
        Ok(())
    }
}
