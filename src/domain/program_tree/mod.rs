//! Program trees: the content of one training, mini-training or group.
//!
//! Nodes form a DAG: a node can be the child of several parents, so every node
//! lives once in the tree's arena and links address their endpoints by arena
//! index. A node occurrence is addressed by a [`TreePath`] of node ids.

mod builder;
mod edit;
mod iter;
mod path;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::authorized_relationship::AuthorizedRelationshipList;
use crate::domain::error::{BusinessError, DomainError, DomainResult};
use crate::domain::identity::{NodeIdentity, ProgramTreeIdentity};
use crate::domain::link::{Link, LinkAttributes};
use crate::domain::node::{Node, NodeId};
use crate::domain::node_type::{GroupType, MiniTrainingType, NodeType, TrainingType};
use crate::domain::prerequisite::Prerequisites;

pub use builder::ProgramTreeBuilder;
pub use edit::EditionContext;
pub use iter::{NodeIterator, PathIterator};
pub use path::{TreePath, PATH_SEPARATOR};

/// Handle of a node inside one tree's arena.
pub type NodeIndex = Index;

#[derive(Debug, Clone)]
pub struct ProgramTree {
    arena: Arena<Node>,
    root: NodeIndex,
    identities: HashMap<NodeIdentity, NodeIndex>,
    authorized_relationships: Arc<AuthorizedRelationshipList>,
    prerequisites: Prerequisites,
}

impl ProgramTree {
    /// Tree made of `root_node` alone; children of `root_node` are ignored.
    pub fn new(root_node: Node, authorized_relationships: Arc<AuthorizedRelationshipList>) -> Self {
        let identity = root_node.entity_id();
        let mut arena = Arena::new();
        let root = arena.insert(root_node.detached_copy());
        let mut identities = HashMap::new();
        identities.insert(identity.clone(), root);
        Self {
            arena,
            root,
            identities,
            authorized_relationships,
            prerequisites: Prerequisites::new(identity.into()),
        }
    }

    pub fn entity_id(&self) -> ProgramTreeIdentity {
        self.root_node().entity_id().into()
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root)
    }

    pub fn root_path(&self) -> TreePath {
        TreePath::root(self.root_node().node_id)
    }

    /// Node behind an index handed out by this tree.
    ///
    /// Indices stay valid as long as the node is reachable from the root.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.arena[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.arena[index]
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }

    pub fn authorized_relationships(&self) -> &AuthorizedRelationshipList {
        &self.authorized_relationships
    }

    pub fn shared_authorized_relationships(&self) -> Arc<AuthorizedRelationshipList> {
        Arc::clone(&self.authorized_relationships)
    }

    pub fn prerequisites(&self) -> &Prerequisites {
        &self.prerequisites
    }

    pub fn set_prerequisites(&mut self, prerequisites: Prerequisites) {
        self.prerequisites = prerequisites;
    }

    pub fn is_master_2m(&self) -> bool {
        self.root_node().is_master_2m()
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_node().children.is_empty()
    }

    pub fn find(&self, identity: &NodeIdentity) -> Option<NodeIndex> {
        self.identities.get(identity).copied()
    }

    pub fn contains(&self, identity: &NodeIdentity) -> bool {
        self.identities.contains_key(identity)
    }

    pub fn find_by_node_id(&self, node_id: NodeId) -> Option<NodeIndex> {
        self.arena
            .iter()
            .find(|(_, node)| node.node_id == node_id)
            .map(|(index, _)| index)
    }

    // ---------------------------------------------------------------- building

    /// Adds `node` to the arena unless a node with the same identity is present.
    #[instrument(level = "trace", skip(self, node), fields(code = %node.code))]
    pub fn insert_node(&mut self, node: Node) -> NodeIndex {
        let identity = node.entity_id();
        if let Some(existing) = self.identities.get(&identity) {
            return *existing;
        }
        let index = self.arena.insert(node.detached_copy());
        self.identities.insert(identity, index);
        index
    }

    /// Appends a link at the end of the parent's children.
    pub fn add_link(
        &mut self,
        parent: NodeIndex,
        child: NodeIndex,
        attributes: LinkAttributes,
    ) -> DomainResult<&Link> {
        self.ensure_not_leaf(parent)?;
        let children = &mut self.arena[parent].children;
        let order = children.len();
        children.push(Link::new(parent, child, order, attributes));
        trace!(order, "link added");
        Ok(&children[order])
    }

    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        child: Node,
        attributes: LinkAttributes,
    ) -> DomainResult<NodeIndex> {
        self.ensure_not_leaf(parent)?;
        let child = self.insert_node(child);
        self.add_link(parent, child, attributes)?;
        Ok(child)
    }

    fn ensure_not_leaf(&self, parent: NodeIndex) -> DomainResult<()> {
        let parent = self.node(parent);
        if parent.is_learning_unit() {
            return Err(BusinessError::ParentIsLeaf {
                parent: parent.entity_id(),
            }
            .into());
        }
        Ok(())
    }

    /// Copies the subtree of `source` rooted at `source_index` into this tree.
    ///
    /// A node already present keeps its children here: the source's children
    /// of that node are not merged.
    pub fn import_subtree(&mut self, source: &ProgramTree, source_index: NodeIndex) -> NodeIndex {
        let source_node = source.node(source_index);
        if let Some(existing) = self.find(&source_node.entity_id()) {
            return existing;
        }
        let index = self.insert_node(source_node.detached_copy());
        for link in &source_node.children {
            let child = self.import_subtree(source, link.child);
            let order = self.arena[index].children.len();
            self.arena[index]
                .children
                .push(Link::new(index, child, order, link.attributes.clone()));
        }
        index
    }

    /// Removes the link `parent -> child` and renumbers the remaining siblings.
    pub(crate) fn remove_link(&mut self, parent: NodeIndex, child: NodeIndex) -> Option<Link> {
        let children = &mut self.arena.get_mut(parent)?.children;
        let position = children.iter().position(|link| link.child == child)?;
        let link = children.remove(position);
        for (order, sibling) in children.iter_mut().enumerate() {
            sibling.order = order;
        }
        Some(link)
    }

    /// Drops nodes no longer reachable from the root.
    pub(crate) fn prune_unreachable(&mut self) {
        let reachable: HashSet<NodeIndex> = self.iter_nodes_from(self.root).collect();
        let unreachable: Vec<NodeIndex> = self
            .arena
            .iter()
            .map(|(index, _)| index)
            .filter(|index| !reachable.contains(index))
            .collect();
        for index in unreachable {
            if let Some(node) = self.arena.remove(index) {
                self.identities.remove(&node.entity_id());
                trace!(code = %node.code, "pruned");
            }
        }
    }

    /// Changes the code of a node, keeping its links.
    pub(crate) fn rename_node(&mut self, index: NodeIndex, code: String) {
        let old = self.node(index).entity_id();
        self.identities.remove(&old);
        let node = self.node_mut(index);
        node.code = code;
        let new = node.entity_id();
        self.identities.insert(new, index);
    }

    pub(crate) fn prerequisites_mut(&mut self) -> &mut Prerequisites {
        &mut self.prerequisites
    }

    pub(crate) fn link_mut(&mut self, parent: NodeIndex, child: NodeIndex) -> Option<&mut Link> {
        self.arena
            .get_mut(parent)?
            .children
            .iter_mut()
            .find(|link| link.child == child)
    }

    // ---------------------------------------------------------------- navigation

    pub fn iter_paths(&self) -> PathIterator<'_> {
        PathIterator::new(self)
    }

    pub fn iter_nodes_from(&self, start: NodeIndex) -> NodeIterator<'_> {
        NodeIterator::new(self, start)
    }

    /// Node at the end of `path`.
    pub fn get_node(&self, path: &TreePath) -> DomainResult<NodeIndex> {
        let not_found = || DomainError::NodeNotFound {
            path: path.to_string(),
        };
        let (first, rest) = path.ids().split_first().ok_or_else(not_found)?;
        if self.root_node().node_id != *first {
            return Err(not_found());
        }
        rest.iter().try_fold(self.root, |current, node_id| {
            self.node(current)
                .children
                .iter()
                .find(|link| self.node(link.child).node_id == *node_id)
                .map(|link| link.child)
                .ok_or_else(not_found)
        })
    }

    /// Parses `path` then resolves it.
    pub fn get_node_by_path(&self, path: &str) -> DomainResult<NodeIndex> {
        let path: TreePath = path.parse()?;
        self.get_node(&path)
    }

    /// Ancestors of the node at `path`, nearest first.
    pub fn get_parents(&self, path: &TreePath) -> DomainResult<Vec<NodeIndex>> {
        self.get_node(path)?;
        path.ancestors()
            .iter()
            .map(|ancestor| self.get_node(ancestor))
            .collect()
    }

    /// Distinct nodes in depth-first order, optionally restricted to `types`.
    pub fn get_all_nodes(&self, types: Option<&[NodeType]>) -> Vec<NodeIndex> {
        self.iter_nodes_from(self.root)
            .filter(|index| types.map_or(true, |t| t.contains(&self.node(*index).node_type)))
            .collect()
    }

    pub fn get_all_links(&self) -> Vec<&Link> {
        self.get_all_nodes(None)
            .into_iter()
            .flat_map(|index| self.node(index).children.iter())
            .collect()
    }

    pub fn get_all_learning_unit_nodes(&self) -> Vec<NodeIndex> {
        self.get_all_nodes(Some(&[NodeType::LearningUnit]))
    }

    pub fn paths_by_node(&self) -> HashMap<NodeIndex, Vec<TreePath>> {
        let mut paths: HashMap<NodeIndex, Vec<TreePath>> = HashMap::new();
        for (path, index) in self.iter_paths() {
            paths.entry(index).or_default().push(path);
        }
        paths
    }

    pub fn get_paths_from_node(&self, index: NodeIndex) -> Vec<TreePath> {
        self.iter_paths()
            .filter(|(_, candidate)| *candidate == index)
            .map(|(path, _)| path)
            .collect()
    }

    /// First path of `index` in depth-first, order-respecting traversal.
    pub fn get_node_smallest_ordered_path(&self, index: NodeIndex) -> Option<TreePath> {
        self.iter_paths()
            .find(|(_, candidate)| *candidate == index)
            .map(|(path, _)| path)
    }

    pub fn get_link(&self, parent: NodeIndex, child: NodeIndex) -> Option<&Link> {
        self.get(parent)?
            .children
            .iter()
            .find(|link| link.child == child)
    }

    /// Direct child of `parent` with identity `child`.
    pub fn get_direct_child(&self, parent: NodeIndex, child: &NodeIdentity) -> Option<NodeIndex> {
        let child = self.find(child)?;
        self.get_link(parent, child).map(|link| link.child)
    }

    pub fn search_links_using_node(&self, child: NodeIndex) -> Vec<&Link> {
        self.get_all_links()
            .into_iter()
            .filter(|link| link.child == child)
            .collect()
    }

    pub fn get_first_link_occurrence_using_node(&self, child: NodeIndex) -> Option<&Link> {
        let path = self.get_node_smallest_ordered_path(child)?;
        let parent = self.get_node(&path.parent()?).ok()?;
        self.get_link(parent, child)
    }

    pub fn count_usage(&self, index: NodeIndex) -> usize {
        self.search_links_using_node(index).len()
    }

    pub fn get_all_finalities(&self) -> Vec<NodeIndex> {
        self.iter_nodes_from(self.root)
            .filter(|index| self.node(*index).is_finality())
            .collect()
    }

    /// Distinct descendants of `index`, optionally restricted to `filter_types`.
    ///
    /// Nodes whose type is in `ignore_children_from` are returned but not descended into.
    pub fn get_all_children_as_nodes(
        &self,
        index: NodeIndex,
        filter_types: Option<&[NodeType]>,
        ignore_children_from: &[NodeType],
    ) -> Vec<NodeIndex> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack: Vec<NodeIndex> = self
            .node(index)
            .children
            .iter()
            .rev()
            .map(|link| link.child)
            .collect();
        while let Some(current) = stack.pop() {
            if current == index || !visited.insert(current) {
                continue;
            }
            let node = self.node(current);
            if filter_types.map_or(true, |types| types.contains(&node.node_type)) {
                result.push(current);
            }
            if !ignore_children_from.contains(&node.node_type) {
                stack.extend(node.children.iter().rev().map(|link| link.child));
            }
        }
        result
    }

    /// Options below `index`.
    pub fn get_option_list(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.get_all_children_as_nodes(index, Some(&[MiniTrainingType::Option.into()]), &[])
    }

    /// Options of a 2M outside of its finalities; empty unless the root is a 2M.
    pub fn get_2m_option_list(&self) -> Vec<NodeIndex> {
        if !self.is_master_2m() {
            return Vec::new();
        }
        let ignore: Vec<NodeType> = GroupType::finality_list_choice()
            .iter()
            .map(|t| NodeType::from(*t))
            .chain(TrainingType::finality_types().iter().map(|t| NodeType::from(*t)))
            .collect();
        self.get_all_children_as_nodes(self.root, Some(&[MiniTrainingType::Option.into()]), &ignore)
    }

    /// Children with reference links replaced by the children of their child.
    pub fn children_as_nodes_with_respect_to_reference_link(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.node(index)
            .children
            .iter()
            .flat_map(|link| {
                if link.is_reference() {
                    self.children_as_nodes_with_respect_to_reference_link(link.child)
                } else {
                    vec![link.child]
                }
            })
            .collect()
    }

    pub fn get_children_types(
        &self,
        index: NodeIndex,
        include_nodes_used_as_reference: bool,
    ) -> Vec<NodeType> {
        if include_nodes_used_as_reference {
            self.children_as_nodes_with_respect_to_reference_link(index)
                .into_iter()
                .map(|child| self.node(child).node_type)
                .collect()
        } else {
            self.node(index)
                .children
                .iter()
                .map(|link| self.node(link.child).node_type)
                .collect()
        }
    }

    /// Parents of `child`; a parent inlined through a reference link is replaced
    /// by the parents above that reference.
    pub fn get_parents_using_node_with_respect_to_reference(&self, child: NodeIndex) -> Vec<NodeIndex> {
        let mut result = Vec::new();
        for link in self.search_links_using_node(child) {
            for parent in self.substitute_referenced(link.parent) {
                if !result.contains(&parent) {
                    result.push(parent);
                }
            }
        }
        result
    }

    fn substitute_referenced(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let incoming = self.search_links_using_node(index);
        let mut result = Vec::new();
        if index == self.root || incoming.iter().any(|link| !link.is_reference()) {
            result.push(index);
        }
        for link in incoming.iter().filter(|link| link.is_reference()) {
            result.extend(self.substitute_referenced(link.parent));
        }
        result
    }

    /// Learning units a prerequisite of `owner` may mention.
    ///
    /// Learning units of minors and deepenings are only visible from inside them.
    pub fn get_nodes_permitted_as_prerequisite(&self, owner: NodeIndex) -> Vec<NodeIndex> {
        let minors: Vec<NodeType> = MiniTrainingType::minors_and_deepening()
            .iter()
            .map(|t| NodeType::from(*t))
            .collect();
        let mut permitted =
            self.get_all_children_as_nodes(self.root, Some(&[NodeType::LearningUnit]), &minors);
        for minor in self.get_all_nodes(Some(&minors)) {
            let content = self.get_all_children_as_nodes(minor, None, &[]);
            if content.contains(&owner) {
                for learning_unit in content {
                    if self.node(learning_unit).is_learning_unit() && !permitted.contains(&learning_unit) {
                        permitted.push(learning_unit);
                    }
                }
            }
        }
        permitted
    }

    pub fn get_codes_permitted_as_prerequisite(&self, owner: NodeIndex) -> BTreeSet<String> {
        self.get_nodes_permitted_as_prerequisite(owner)
            .into_iter()
            .map(|index| self.node(index).code.clone())
            .collect()
    }

    pub fn is_prerequisite(&self, index: NodeIndex) -> bool {
        self.prerequisites.is_prerequisite(&self.node(index).code)
    }

    pub fn has_prerequisite(&self, index: NodeIndex) -> bool {
        self.prerequisites
            .has_prerequisite(&self.node(index).entity_id())
    }

    /// Copy of the tree where `parent -> child` no longer exists, wherever `parent` occurs.
    pub fn without_link(&self, parent: &NodeIdentity, child: &NodeIdentity) -> ProgramTree {
        let mut copy = self.clone();
        if let (Some(parent), Some(child)) = (copy.find(parent), copy.find(child)) {
            copy.remove_link(parent, child);
            copy.prune_unreachable();
        }
        copy
    }

    /// Copy of the tree where `pasted` is attached under `parent`, wherever `parent` occurs.
    pub fn with_pasted(
        &self,
        parent: &NodeIdentity,
        pasted: &ProgramTree,
        attributes: LinkAttributes,
    ) -> DomainResult<ProgramTree> {
        let mut copy = self.clone();
        if let Some(parent) = copy.find(parent) {
            if copy.creates_cycle(parent, pasted) {
                return Ok(copy);
            }
            let child = copy.import_subtree(pasted, pasted.root());
            copy.add_link(parent, child, attributes)?;
        }
        Ok(copy)
    }

    /// Identities of every ancestor of `index`, over all of its paths.
    pub fn ancestor_identities(&self, index: NodeIndex) -> BTreeSet<NodeIdentity> {
        self.get_paths_from_node(index)
            .iter()
            .filter_map(|path| self.get_parents(path).ok())
            .flatten()
            .map(|ancestor| self.node(ancestor).entity_id())
            .collect()
    }

    /// Whether attaching `pasted` under `parent` would make a node its own descendant.
    pub fn creates_cycle(&self, parent: NodeIndex, pasted: &ProgramTree) -> bool {
        pasted.contains(&self.node(parent).entity_id())
            || self
                .ancestor_identities(parent)
                .iter()
                .any(|ancestor| pasted.contains(ancestor))
    }

    /// Identities of every distinct node.
    pub fn identities(&self) -> BTreeSet<NodeIdentity> {
        self.iter_nodes_from(self.root)
            .map(|index| self.node(index).entity_id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authorized_relationship::AuthorizedRelationshipList;
    use crate::domain::node_type::GroupType;

    fn tree() -> ProgramTree {
        let root = Node::group(1, "LBIR100B", 2020, TrainingType::Bachelor);
        let mut tree = ProgramTree::new(root, Arc::new(AuthorizedRelationshipList::default()));
        let common_core = tree
            .add_child(
                tree.root(),
                Node::group(2, "LBIR101T", 2020, GroupType::CommonCore),
                LinkAttributes::default(),
            )
            .unwrap();
        let sub_group = tree
            .add_child(
                common_core,
                Node::group(3, "LBIR102G", 2020, GroupType::SubGroup),
                LinkAttributes::default(),
            )
            .unwrap();
        tree.add_child(sub_group, Node::learning_unit(4, "LBIR1100", 2020), LinkAttributes::default())
            .unwrap();
        tree.add_child(common_core, Node::learning_unit(4, "LBIR1100", 2020), LinkAttributes::default())
            .unwrap();
        tree
    }

    #[test]
    fn given_shared_node_when_listing_paths_then_one_path_per_occurrence() {
        let tree = tree();
        let learning_unit = tree.find(&NodeIdentity::new("LBIR1100", 2020)).unwrap();

        let paths = tree.get_paths_from_node(learning_unit);

        assert_eq!(paths.len(), 2);
        assert_eq!(
            tree.get_node_smallest_ordered_path(learning_unit).unwrap().to_string(),
            "1|2|3|4"
        );
        assert_eq!(tree.count_usage(learning_unit), 2);
        assert_eq!(tree.get_all_nodes(None).len(), 4);
    }

    #[test]
    fn given_removed_link_when_pruning_then_unreachable_nodes_are_dropped() {
        let mut tree = tree();
        let common_core = tree.get_node_by_path("1|2").unwrap();
        let sub_group = tree.get_node_by_path("1|2|3").unwrap();

        tree.remove_link(common_core, sub_group);
        tree.prune_unreachable();

        assert!(!tree.contains(&NodeIdentity::new("LBIR102G", 2020)));
        assert!(tree.contains(&NodeIdentity::new("LBIR1100", 2020)));
        assert_eq!(tree.node(common_core).children[0].order, 0);
    }

    #[test]
    fn given_unknown_path_when_resolving_then_node_not_found() {
        let tree = tree();
        assert!(matches!(
            tree.get_node_by_path("1|99"),
            Err(DomainError::NodeNotFound { .. })
        ));
        assert!(matches!(
            tree.get_node_by_path("2"),
            Err(DomainError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn given_learning_unit_parent_when_adding_link_then_parent_is_leaf() {
        let mut tree = tree();
        let learning_unit = tree.get_node_by_path("1|2|4").unwrap();
        let result = tree.add_child(
            learning_unit,
            Node::learning_unit(5, "LBIR1200", 2020),
            LinkAttributes::default(),
        );
        let err = result.unwrap_err();
        assert_eq!(err.business_errors().unwrap().codes(), vec!["ParentIsLeaf"]);
    }
}
