//! Edition of the content of a program tree
//!
//! Each call loads the trees it touches, runs the domain operation on them and
//! writes them back only when every validation passed.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::command::{
    DetachNodeCommand, OrderLinkCommand, PasteElementCommand, SetPrerequisiteCommand,
    UpdateLinkCommand,
};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::repository::{NodeRepository, ProgramTreeRepository, ProgramTreeVersionRepository};
use crate::domain::service::{search_node_paths, ProgramTreeIdentitySearch};
use crate::domain::validators::{BusinessValidator, CheckProgramTreeValidatorList};
use crate::domain::{
    DomainError, DomainResult, EditionContext, Link, LinkIdentity, NodeIdentity, NodeIndex, ProgramTree,
    ProgramTreeIdentity, TreePath,
};

pub struct ProgramTreeService {
    tree_repository: Arc<dyn ProgramTreeRepository>,
    version_repository: Arc<dyn ProgramTreeVersionRepository>,
    node_repository: Arc<dyn NodeRepository>,
    settings: Arc<Settings>,
}

impl ProgramTreeService {
    pub fn new(
        tree_repository: Arc<dyn ProgramTreeRepository>,
        version_repository: Arc<dyn ProgramTreeVersionRepository>,
        node_repository: Arc<dyn NodeRepository>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            tree_repository,
            version_repository,
            node_repository,
            settings,
        }
    }

    fn context(&self) -> EditionContext<'_> {
        EditionContext {
            tree_repository: self.tree_repository.as_ref(),
            version_repository: self.version_repository.as_ref(),
            year_limit_edg_modification: self.settings.year_limit_edg_modification,
        }
    }

    /// Tree whose root is the first node of `path`.
    fn tree_from_path(&self, path: &str) -> ApplicationResult<ProgramTree> {
        let identity = ProgramTreeIdentitySearch::new(self.node_repository.as_ref()).get_from_path(path)?;
        Ok(self.tree_repository.get(&identity)?)
    }

    /// Pastes a stored node under the node at `paste.path_where_to_paste`.
    ///
    /// With `path_where_to_detach`, the node is also detached from there; both
    /// trees are saved only when both operations pass.
    #[instrument(skip(self), fields(path = %cmd.paste.path_where_to_paste, node = %cmd.node_to_paste_code))]
    pub fn paste_element(&self, cmd: &PasteElementCommand) -> ApplicationResult<LinkIdentity> {
        let context = self.context();
        let mut working_tree = self.tree_from_path(&cmd.paste.path_where_to_paste)?;
        let node_to_paste = NodeIdentity::new(&cmd.node_to_paste_code, cmd.node_to_paste_year);
        let tree_to_paste = self.tree_repository.get(&ProgramTreeIdentity::from(&node_to_paste))?;

        let mut detached_from: Option<ProgramTree> = None;
        if let Some(path_to_detach) = &cmd.paste.path_where_to_detach {
            let source_identity =
                ProgramTreeIdentitySearch::new(self.node_repository.as_ref()).get_from_path(path_to_detach)?;
            if source_identity == working_tree.entity_id() {
                working_tree.detach_node(path_to_detach, &context)?;
            } else {
                let mut source = self.tree_repository.get(&source_identity)?;
                source.detach_node(path_to_detach, &context)?;
                detached_from = Some(source);
            }
        }

        let link = working_tree.paste_node(&tree_to_paste, &cmd.paste, &context)?;
        let identity = self.link_identity(&working_tree, &link);

        self.tree_repository.update(&working_tree)?;
        if let Some(source) = detached_from {
            self.tree_repository.update(&source)?;
            debug!(tree = %source.entity_id(), "source tree saved");
        }
        info!(link = %identity, "element pasted");
        Ok(identity)
    }

    #[instrument(skip(self), fields(path = %cmd.path_where_to_detach))]
    pub fn detach_node(&self, cmd: &DetachNodeCommand) -> ApplicationResult<LinkIdentity> {
        let mut tree = self.tree_from_path(&cmd.path_where_to_detach)?;
        let identity = tree.detach_node(&cmd.path_where_to_detach, &self.context())?;
        self.tree_repository.update(&tree)?;
        info!(link = %identity, "node detached");
        Ok(identity)
    }

    #[instrument(skip(self), fields(parent = %cmd.parent_node_path, child = %cmd.child_node_code))]
    pub fn update_link(&self, cmd: &UpdateLinkCommand) -> ApplicationResult<LinkIdentity> {
        let mut tree = self.tree_from_path(&cmd.parent_node_path)?;
        let parent_path: TreePath = cmd.parent_node_path.parse().map_err(DomainError::from)?;
        let child = NodeIdentity::new(&cmd.child_node_code, cmd.child_node_year);
        let link = tree.update_link(&parent_path, &child, &cmd.update)?;
        let identity = self.link_identity(&tree, &link);
        self.tree_repository.update(&tree)?;
        info!(link = %identity, "link updated");
        Ok(identity)
    }

    #[instrument(skip(self), fields(path = %cmd.path))]
    pub fn order_up_link(&self, cmd: &OrderLinkCommand) -> ApplicationResult<LinkIdentity> {
        self.order_link(cmd, ProgramTree::up_link)
    }

    #[instrument(skip(self), fields(path = %cmd.path))]
    pub fn order_down_link(&self, cmd: &OrderLinkCommand) -> ApplicationResult<LinkIdentity> {
        self.order_link(cmd, ProgramTree::down_link)
    }

    fn order_link(
        &self,
        cmd: &OrderLinkCommand,
        move_link: fn(&mut ProgramTree, NodeIndex, NodeIndex) -> DomainResult<Link>,
    ) -> ApplicationResult<LinkIdentity> {
        let mut tree = self.tree_from_path(&cmd.path)?;
        let path: TreePath = cmd.path.parse().map_err(DomainError::from)?;
        let child = tree.get_node(&path)?;
        let parent_path = path.parent().ok_or_else(|| DomainError::NodeNotFound {
            path: cmd.path.clone(),
        })?;
        let parent = tree.get_node(&parent_path)?;

        let link = move_link(&mut tree, parent, child)?;
        let identity = self.link_identity(&tree, &link);
        self.tree_repository.update(&tree)?;
        debug!(link = %identity, order = link.order, "link moved");
        Ok(identity)
    }

    /// Sets the prerequisite of a learning unit in the context of one tree.
    #[instrument(skip(self), fields(node = %cmd.node_code, tree = %cmd.program_tree_root_code))]
    pub fn set_prerequisite(&self, cmd: &SetPrerequisiteCommand) -> ApplicationResult<NodeIdentity> {
        let tree_identity = ProgramTreeIdentity::new(&cmd.program_tree_root_code, cmd.program_tree_root_year);
        let mut tree = self.tree_repository.get(&tree_identity)?;
        let node_identity = NodeIdentity::new(&cmd.node_code, cmd.node_year);
        let node = tree.find(&node_identity).ok_or_else(|| DomainError::NodeNotFound {
            path: node_identity.to_string(),
        })?;

        tree.set_prerequisite(&cmd.prerequisite_string, node)?;
        self.tree_repository.update(&tree)?;
        info!(node = %node_identity, "prerequisite set");
        Ok(node_identity)
    }

    /// Every path leading to `node` in the tree `tree`.
    pub fn search_node_paths(
        &self,
        tree: &ProgramTreeIdentity,
        node: &NodeIdentity,
    ) -> ApplicationResult<Vec<TreePath>> {
        let tree = self.tree_repository.get(tree)?;
        Ok(search_node_paths(&tree, node))
    }

    /// Checks every invariant of a stored tree, reporting all broken rules.
    #[instrument(skip(self))]
    pub fn check_program_tree(&self, identity: &ProgramTreeIdentity) -> ApplicationResult<()> {
        let tree = self.tree_repository.get(identity)?;
        CheckProgramTreeValidatorList::new(&tree).validate()?;
        Ok(())
    }

    fn link_identity(&self, tree: &ProgramTree, link: &Link) -> LinkIdentity {
        LinkIdentity::new(&tree.node(link.parent).entity_id(), &tree.node(link.child).entity_id())
    }
}
