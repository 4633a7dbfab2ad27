//! In-memory graph store behind the repository traits
//!
//! Nodes are stored once per identity, links as ordered children lists keyed by
//! the parent identity. A tree is rebuilt from its root on every `get`.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument, trace};

use crate::domain::prerequisite::{Prerequisite, Prerequisites};
use crate::domain::repository::{NodeRepository, ProgramTreeRepository, ProgramTreeVersionRepository};
use crate::domain::{
    AuthorizedRelationshipList, DomainError, DomainResult, LinkAttributes, Node, NodeId, NodeIdentity, NodeIndex,
    ProgramTree, ProgramTreeIdentity, ProgramTreeVersion, ProgramTreeVersionIdentity,
};

#[derive(Debug, Clone)]
struct StoredLink {
    child: NodeIdentity,
    attributes: LinkAttributes,
}

#[derive(Debug, Default)]
struct Store {
    nodes: HashMap<NodeIdentity, Node>,
    links: HashMap<NodeIdentity, Vec<StoredLink>>,
    /// Roots of the trees created so far.
    trees: BTreeSet<ProgramTreeIdentity>,
    prerequisites: HashMap<ProgramTreeIdentity, Vec<Prerequisite>>,
    versions: BTreeMap<ProgramTreeVersionIdentity, ProgramTreeVersion>,
}

impl Store {
    fn parents_of(&self, child: &NodeIdentity) -> Vec<&NodeIdentity> {
        self.links
            .iter()
            .filter(|(_, children)| children.iter().any(|link| &link.child == child))
            .map(|(parent, _)| parent)
            .collect()
    }

    fn load_children(&self, tree: &mut ProgramTree, parent: NodeIndex) -> DomainResult<()> {
        let parent_identity = tree.node(parent).entity_id();
        let Some(children) = self.links.get(&parent_identity) else {
            return Ok(());
        };
        for link in children {
            let (child, is_new) = match tree.find(&link.child) {
                Some(existing) => (existing, false),
                None => {
                    let node = self.nodes.get(&link.child).ok_or_else(|| DomainError::Repository {
                        context: format!("link {} -> {} targets an unknown node", parent_identity, link.child),
                    })?;
                    (tree.insert_node(node.clone()), true)
                }
            };
            tree.add_link(parent, child, link.attributes.clone())?;
            if is_new {
                self.load_children(tree, child)?;
            }
        }
        Ok(())
    }

    fn build_tree(
        &self,
        identity: &ProgramTreeIdentity,
        relationships: Arc<AuthorizedRelationshipList>,
    ) -> DomainResult<ProgramTree> {
        let root = self
            .nodes
            .get(&NodeIdentity::from(identity))
            .ok_or_else(|| DomainError::ProgramTreeNotFound(identity.clone()))?;
        let mut tree = ProgramTree::new(root.clone(), relationships);
        let root = tree.root();
        self.load_children(&mut tree, root)?;

        let mut prerequisites = Prerequisites::new(identity.clone());
        for prerequisite in self.prerequisites.get(identity).into_iter().flatten() {
            prerequisites.set(prerequisite.clone());
        }
        tree.set_prerequisites(prerequisites);
        Ok(tree)
    }

    fn write_tree(&mut self, tree: &ProgramTree) {
        for index in tree.iter_nodes_from(tree.root()) {
            let node = tree.node(index);
            let identity = node.entity_id();
            if node.is_group_or_mini_or_training() {
                let children = node
                    .children
                    .iter()
                    .map(|link| StoredLink {
                        child: tree.node(link.child).entity_id(),
                        attributes: link.attributes.clone(),
                    })
                    .collect();
                self.links.insert(identity.clone(), children);
            }
            self.nodes.insert(identity, node.detached_copy());
        }
        self.prerequisites
            .insert(tree.entity_id(), tree.prerequisites().iter().cloned().collect());
    }

    /// Ancestors of `identity`, itself included, that root a tree of their own.
    fn tree_roots_above(&self, identity: &NodeIdentity) -> BTreeSet<NodeIdentity> {
        let mut roots = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([identity.clone()]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let parents = self.parents_of(&current);
            let is_root = parents.is_empty()
                || self
                    .nodes
                    .get(&current)
                    .is_some_and(|node| node.is_training() || node.is_mini_training());
            if is_root {
                roots.insert(current.clone());
            }
            queue.extend(parents.into_iter().cloned());
        }
        roots
    }
}

/// Repository of trees, versions and nodes held in memory.
pub struct InMemoryRepository {
    store: RwLock<Store>,
    relationships: Arc<AuthorizedRelationshipList>,
}

impl InMemoryRepository {
    pub fn new(relationships: Arc<AuthorizedRelationshipList>) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            relationships,
        }
    }

    pub fn relationships(&self) -> Arc<AuthorizedRelationshipList> {
        Arc::clone(&self.relationships)
    }

    /// Stores a node without links; an existing node with the same identity is replaced.
    pub fn insert_node(&self, node: Node) {
        let mut store = self.store.write();
        store.nodes.insert(node.entity_id(), node.detached_copy());
    }

    /// Appends `child` to the children of `parent`.
    pub fn insert_link(
        &self,
        parent: &NodeIdentity,
        child: &NodeIdentity,
        attributes: LinkAttributes,
    ) -> DomainResult<()> {
        let mut store = self.store.write();
        for identity in [parent, child] {
            if !store.nodes.contains_key(identity) {
                return Err(DomainError::NodeNotFound {
                    path: identity.to_string(),
                });
            }
        }
        store.links.entry(parent.clone()).or_default().push(StoredLink {
            child: child.clone(),
            attributes,
        });
        Ok(())
    }

    /// Marks a stored node as the root of a tree.
    pub fn register_tree(&self, identity: ProgramTreeIdentity) {
        self.store.write().trees.insert(identity);
    }

    pub fn insert_prerequisite(&self, prerequisite: Prerequisite) {
        let mut store = self.store.write();
        let prerequisites = store
            .prerequisites
            .entry(prerequisite.context_tree.clone())
            .or_default();
        prerequisites.retain(|p| p.node_having_prerequisites != prerequisite.node_having_prerequisites);
        prerequisites.push(prerequisite);
    }

    /// Roots of the created trees, ordered by code and year.
    pub fn tree_identities(&self) -> Vec<ProgramTreeIdentity> {
        self.store.read().trees.iter().cloned().collect()
    }

    pub fn node_count(&self) -> usize {
        self.store.read().nodes.len()
    }
}

impl ProgramTreeRepository for InMemoryRepository {
    #[instrument(level = "trace", skip(self))]
    fn get(&self, identity: &ProgramTreeIdentity) -> DomainResult<ProgramTree> {
        self.store.read().build_tree(identity, self.relationships())
    }

    fn search(&self, identities: &[ProgramTreeIdentity]) -> DomainResult<Vec<ProgramTree>> {
        let store = self.store.read();
        let mut trees = Vec::with_capacity(identities.len());
        for identity in identities {
            match store.build_tree(identity, self.relationships()) {
                Ok(tree) => trees.push(tree),
                Err(DomainError::ProgramTreeNotFound(_)) => trace!(tree = %identity, "skipped"),
                Err(err) => return Err(err),
            }
        }
        Ok(trees)
    }

    fn search_from_children(&self, identities: &[NodeIdentity]) -> DomainResult<Vec<ProgramTree>> {
        let store = self.store.read();
        let roots: BTreeSet<NodeIdentity> = identities
            .iter()
            .filter(|identity| store.nodes.contains_key(*identity))
            .flat_map(|identity| store.tree_roots_above(identity))
            .collect();
        debug!(roots = roots.len(), "trees using children");
        roots
            .iter()
            .map(|root| store.build_tree(&ProgramTreeIdentity::from(root), self.relationships()))
            .collect()
    }

    #[instrument(skip(self, tree), fields(tree = %tree.entity_id()))]
    fn create(&self, tree: &ProgramTree) -> DomainResult<ProgramTreeIdentity> {
        let identity = tree.entity_id();
        let mut store = self.store.write();
        if store.trees.contains(&identity) {
            return Err(DomainError::ProgramTreeAlreadyExists(identity));
        }
        store.write_tree(tree);
        store.trees.insert(identity.clone());
        debug!(nodes = tree.len(), "tree created");
        Ok(identity)
    }

    #[instrument(skip(self, tree), fields(tree = %tree.entity_id()))]
    fn update(&self, tree: &ProgramTree) -> DomainResult<ProgramTreeIdentity> {
        let identity = tree.entity_id();
        let mut store = self.store.write();
        store.write_tree(tree);
        store.trees.insert(identity.clone());
        Ok(identity)
    }

    /// Learning units and roots of other trees are kept.
    #[instrument(skip(self))]
    fn delete(&self, identity: &ProgramTreeIdentity) -> DomainResult<()> {
        let mut store = self.store.write();
        let root = NodeIdentity::from(identity);
        if !store.nodes.contains_key(&root) {
            return Err(DomainError::ProgramTreeNotFound(identity.clone()));
        }
        store.trees.remove(identity);
        store.prerequisites.remove(identity);

        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let children = store.links.remove(&current).unwrap_or_default();
            store.nodes.remove(&current);
            trace!(node = %current, "deleted");
            for link in children {
                let keep = store.trees.contains(&ProgramTreeIdentity::from(&link.child))
                    || !store.parents_of(&link.child).is_empty()
                    || store.nodes.get(&link.child).map_or(true, |node| node.is_learning_unit());
                if !keep {
                    queue.push_back(link.child);
                }
            }
        }
        Ok(())
    }
}

impl ProgramTreeVersionRepository for InMemoryRepository {
    fn get(&self, identity: &ProgramTreeVersionIdentity) -> DomainResult<ProgramTreeVersion> {
        self.store
            .read()
            .versions
            .get(identity)
            .cloned()
            .ok_or_else(|| DomainError::ProgramTreeVersionNotFound(identity.clone()))
    }

    fn search_all_versions_from_root_node(&self, node: &NodeIdentity) -> DomainResult<Vec<ProgramTreeVersion>> {
        let tree = ProgramTreeIdentity::from(node);
        let mut versions: Vec<ProgramTreeVersion> = self
            .store
            .read()
            .versions
            .values()
            .filter(|version| version.program_tree_identity == tree)
            .cloned()
            .collect();
        versions.sort_by(|a, b| {
            (a.version_name(), a.is_transition()).cmp(&(b.version_name(), b.is_transition()))
        });
        Ok(versions)
    }

    fn search_versions_from_trees(&self, trees: &[ProgramTree]) -> DomainResult<Vec<ProgramTreeVersion>> {
        let identities: BTreeSet<ProgramTreeIdentity> = trees.iter().map(ProgramTree::entity_id).collect();
        Ok(self
            .store
            .read()
            .versions
            .values()
            .filter(|version| identities.contains(&version.program_tree_identity))
            .cloned()
            .collect())
    }

    fn search_versions_of_offer(&self, offer_acronym: &str, year: u32) -> DomainResult<Vec<ProgramTreeVersion>> {
        Ok(self
            .store
            .read()
            .versions
            .values()
            .filter(|version| version.offer_acronym() == offer_acronym && version.year() == year)
            .cloned()
            .collect())
    }

    fn get_last_in_past(&self, identity: &ProgramTreeVersionIdentity) -> DomainResult<ProgramTreeVersion> {
        self.store
            .read()
            .versions
            .values()
            .filter(|version| {
                let candidate = version.entity_id();
                candidate.offer_acronym == identity.offer_acronym
                    && candidate.version_name == identity.version_name
                    && candidate.is_transition == identity.is_transition
                    && candidate.year <= identity.year
            })
            .max_by_key(|version| version.year())
            .cloned()
            .ok_or_else(|| DomainError::ProgramTreeVersionNotFound(identity.clone()))
    }

    #[instrument(skip(self, version), fields(version = %version.entity_id()))]
    fn create(&self, version: &ProgramTreeVersion) -> DomainResult<ProgramTreeVersionIdentity> {
        let identity = version.entity_id().clone();
        let mut store = self.store.write();
        if store.versions.contains_key(&identity) {
            return Err(DomainError::ProgramTreeVersionAlreadyExists(identity));
        }
        store.versions.insert(identity.clone(), version.clone());
        Ok(identity)
    }

    fn update(&self, version: &ProgramTreeVersion) -> DomainResult<ProgramTreeVersionIdentity> {
        let identity = version.entity_id().clone();
        let mut store = self.store.write();
        match store.versions.get_mut(&identity) {
            Some(stored) => {
                *stored = version.clone();
                Ok(identity)
            }
            None => Err(DomainError::ProgramTreeVersionNotFound(identity)),
        }
    }

    fn delete(&self, identity: &ProgramTreeVersionIdentity) -> DomainResult<()> {
        self.store
            .write()
            .versions
            .remove(identity)
            .map(|_| ())
            .ok_or_else(|| DomainError::ProgramTreeVersionNotFound(identity.clone()))
    }
}

impl NodeRepository for InMemoryRepository {
    fn get(&self, identity: &NodeIdentity) -> DomainResult<Node> {
        self.store
            .read()
            .nodes
            .get(identity)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound {
                path: identity.to_string(),
            })
    }

    fn get_by_node_id(&self, node_id: NodeId) -> DomainResult<Node> {
        self.store
            .read()
            .nodes
            .values()
            .find(|node| node.node_id == node_id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound {
                path: node_id.to_string(),
            })
    }

    fn search(&self, identities: &[NodeIdentity]) -> DomainResult<Vec<Node>> {
        let store = self.store.read();
        Ok(identities
            .iter()
            .filter_map(|identity| store.nodes.get(identity).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorizedRelationship, GroupType, NodeType, TrainingType};
    use rstest::{fixture, rstest};

    #[fixture]
    fn repository() -> InMemoryRepository {
        let relationships = AuthorizedRelationshipList::new(vec![
            AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
            AuthorizedRelationship::new(GroupType::CommonCore, NodeType::LearningUnit, 0, 99),
        ]);
        let repository = InMemoryRepository::new(Arc::new(relationships));
        repository.insert_node(Node::group(1, "LBIR100B", 2020, TrainingType::Bachelor));
        repository.insert_node(Node::group(2, "LBIR101G", 2020, GroupType::CommonCore));
        repository.insert_node(Node::learning_unit(3, "LBIR1100", 2020));
        repository
            .insert_link(
                &NodeIdentity::new("LBIR100B", 2020),
                &NodeIdentity::new("LBIR101G", 2020),
                LinkAttributes::default(),
            )
            .unwrap();
        repository
            .insert_link(
                &NodeIdentity::new("LBIR101G", 2020),
                &NodeIdentity::new("LBIR1100", 2020),
                LinkAttributes::default(),
            )
            .unwrap();
        repository.register_tree(ProgramTreeIdentity::new("LBIR100B", 2020));
        repository
    }

    #[rstest]
    fn given_stored_links_when_getting_tree_then_rebuilds_from_root(repository: InMemoryRepository) {
        // Act
        let tree = ProgramTreeRepository::get(&repository, &ProgramTreeIdentity::new("LBIR100B", 2020)).unwrap();

        // Assert
        assert_eq!(tree.len(), 3);
        assert!(tree.get_node_by_path("1|2|3").is_ok());
    }

    #[rstest]
    fn given_unknown_root_when_getting_tree_then_not_found(repository: InMemoryRepository) {
        let result = ProgramTreeRepository::get(&repository, &ProgramTreeIdentity::new("UNKNOWN", 2020));
        assert!(matches!(result, Err(DomainError::ProgramTreeNotFound(_))));
    }

    #[rstest]
    fn given_registered_tree_when_creating_again_then_already_exists(repository: InMemoryRepository) {
        // Arrange
        let tree = ProgramTreeRepository::get(&repository, &ProgramTreeIdentity::new("LBIR100B", 2020)).unwrap();

        // Act
        let result = ProgramTreeRepository::create(&repository, &tree);

        // Assert
        assert!(matches!(result, Err(DomainError::ProgramTreeAlreadyExists(_))));
    }

    #[rstest]
    fn given_detached_child_when_updating_then_link_is_gone(repository: InMemoryRepository) {
        // Arrange
        let identity = ProgramTreeIdentity::new("LBIR100B", 2020);
        let mut tree = ProgramTreeRepository::get(&repository, &identity).unwrap();
        let common_core = tree.get_node_by_path("1|2").unwrap();
        let learning_unit = tree.get_node_by_path("1|2|3").unwrap();
        tree.remove_link(common_core, learning_unit);

        // Act
        ProgramTreeRepository::update(&repository, &tree).unwrap();

        // Assert
        let reloaded = ProgramTreeRepository::get(&repository, &identity).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[rstest]
    fn given_learning_unit_when_searching_from_children_then_returns_parentless_roots(
        repository: InMemoryRepository,
    ) {
        // Act
        let trees = repository
            .search_from_children(&[NodeIdentity::new("LBIR1100", 2020)])
            .unwrap();

        // Assert
        let roots: Vec<String> = trees.iter().map(|t| t.entity_id().code).collect();
        assert_eq!(roots, vec!["LBIR100B".to_string()]);
    }

    #[rstest]
    fn given_tree_when_deleting_then_groups_go_and_learning_units_stay(repository: InMemoryRepository) {
        // Act
        ProgramTreeRepository::delete(&repository, &ProgramTreeIdentity::new("LBIR100B", 2020)).unwrap();

        // Assert
        assert!(NodeRepository::get(&repository, &NodeIdentity::new("LBIR101G", 2020)).is_err());
        assert!(NodeRepository::get(&repository, &NodeIdentity::new("LBIR1100", 2020)).is_ok());
        assert!(repository.tree_identities().is_empty());
    }

    #[rstest]
    fn given_versions_when_getting_last_in_past_then_closest_earlier_year(repository: InMemoryRepository) {
        // Arrange
        for year in [2018, 2019] {
            let version = ProgramTreeVersion {
                entity_identity: ProgramTreeVersionIdentity::standard("BIR1BA", year),
                program_tree_identity: ProgramTreeIdentity::new("LBIR100B", year),
                title_fr: None,
                title_en: None,
                start_year: 2018,
                end_year_of_existence: None,
            };
            ProgramTreeVersionRepository::create(&repository, &version).unwrap();
        }

        // Act
        let last = repository
            .get_last_in_past(&ProgramTreeVersionIdentity::standard("BIR1BA", 2021))
            .unwrap();

        // Assert
        assert_eq!(last.year(), 2019);
    }
}
