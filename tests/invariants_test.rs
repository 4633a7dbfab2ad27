//! Structural invariants of program trees: paths, link order, edit symmetry and duplication.

mod common;

use std::sync::Arc;

use progtree::application::{DetachNodeCommand, OrderLinkCommand, PasteElementCommand};
use progtree::config::Settings;
use progtree::domain::{
    AuthorizedRelationship, AuthorizedRelationshipList, GroupType, LinkAttributes, Node, NodeFactory, NodeType,
    PasteCommand, ProgramTree, ProgramTreeBuilder, TrainingType, TreePath,
};
use progtree::infrastructure::{ConfigFieldValidationRules, InMemoryRepository};
use rstest::{fixture, rstest};

use common::{container, get_tree, YEAR};

fn relationships() -> Vec<AuthorizedRelationship> {
    vec![
        AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
        AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::SubGroup, 0, 10),
        AuthorizedRelationship::new(GroupType::CommonCore, NodeType::LearningUnit, 0, 99),
        AuthorizedRelationship::new(GroupType::SubGroup, NodeType::LearningUnit, 0, 99),
    ]
}

/// LBIR100B(1) > LBIR101G(2) > LBIR1100(4), and LBIR100B > LBIR102G(3) > LBIR1100(4)
fn shared_learning_unit_tree() -> ProgramTree {
    let root = Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor);
    let mut tree = ProgramTree::new(root, Arc::new(AuthorizedRelationshipList::new(relationships())));
    let root = tree.root();
    let first = tree
        .add_child(root, Node::group(2, "LBIR101G", YEAR, GroupType::CommonCore), LinkAttributes::default())
        .unwrap();
    let second = tree
        .add_child(root, Node::group(3, "LBIR102G", YEAR, GroupType::SubGroup), LinkAttributes::default())
        .unwrap();
    let unit = tree
        .add_child(first, Node::learning_unit(4, "LBIR1100", YEAR), LinkAttributes::default())
        .unwrap();
    tree.add_link(second, unit, LinkAttributes::default()).unwrap();
    tree
}

#[fixture]
fn bachelor() -> InMemoryRepository {
    let repository = common::repository(relationships());
    common::store_tree(
        &repository,
        vec![
            Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor),
            Node::group(2, "LBIR101G", YEAR, GroupType::CommonCore),
        ],
        &[("LBIR100B", "LBIR101G")],
    );
    repository.insert_node(Node::learning_unit(10, "LBIR1100", YEAR));
    repository.insert_node(Node::learning_unit(11, "LBIR1200", YEAR));
    repository.insert_node(Node::learning_unit(12, "LBIR1300", YEAR));
    repository
}

fn paste(code: &str, path: &str) -> PasteElementCommand {
    PasteElementCommand {
        node_to_paste_code: code.to_string(),
        node_to_paste_year: YEAR,
        paste: PasteCommand::new(path),
    }
}

#[rstest]
fn given_shared_node_when_resolving_path_then_smallest_ordered_path_round_trips() {
    // Arrange
    let tree = shared_learning_unit_tree();
    let path: TreePath = "1|2|4".parse().unwrap();

    // Act
    let unit = tree.get_node(&path).unwrap();
    let smallest = tree.get_node_smallest_ordered_path(unit).unwrap();

    // Assert
    assert_eq!(smallest, path);
    assert_eq!(smallest.to_string(), "1|2|4");
    assert_eq!(tree.get_paths_from_node(unit).len(), 2);
    assert_eq!(tree.get_node(&"1|3|4".parse().unwrap()).unwrap(), unit);
}

#[rstest]
fn given_shared_node_when_second_parent_moves_up_then_smallest_path_follows() {
    // Arrange
    let mut tree = shared_learning_unit_tree();
    let root = tree.root();
    let second = tree.get_node_by_path("1|3").unwrap();
    let unit = tree.get_node_by_path("1|3|4").unwrap();

    // Act
    tree.up_link(root, second).unwrap();

    // Assert
    assert_eq!(tree.get_node_smallest_ordered_path(unit).unwrap().to_string(), "1|3|4");
}

#[rstest]
fn given_several_pastes_when_ordering_up_then_orders_stay_contiguous(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    for code in ["LBIR1100", "LBIR1200", "LBIR1300"] {
        container.program_tree_service.paste_element(&paste(code, "1|2")).unwrap();
    }

    // Act
    let link = container
        .program_tree_service
        .order_up_link(&OrderLinkCommand {
            path: "1|2|12".to_string(),
        })
        .unwrap();

    // Assert
    assert_eq!(link.child().code, "LBIR1300");
    let tree = get_tree(&container, "LBIR100B", YEAR);
    let common_core = tree.get_node_by_path("1|2").unwrap();
    let children = &tree.node(common_core).children;
    let orders: Vec<usize> = children.iter().map(|link| link.order).collect();
    let codes: Vec<&str> = children.iter().map(|link| tree.node(link.child).code.as_str()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(codes, vec!["LBIR1100", "LBIR1300", "LBIR1200"]);
}

#[rstest]
fn given_first_link_when_ordering_up_then_nothing_moves(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR1100", "1|2")).unwrap();
    container.program_tree_service.paste_element(&paste("LBIR1200", "1|2")).unwrap();

    // Act
    container
        .program_tree_service
        .order_up_link(&OrderLinkCommand {
            path: "1|2|10".to_string(),
        })
        .unwrap();

    // Assert
    let tree = get_tree(&container, "LBIR100B", YEAR);
    let first = &tree.node(tree.get_node_by_path("1|2").unwrap()).children[0];
    assert_eq!(tree.node(first.child).code, "LBIR1100");
    assert_eq!(first.order, 0);
}

#[rstest]
fn given_paste_when_detaching_same_node_then_tree_restored(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    let before = get_tree(&container, "LBIR100B", YEAR);

    // Act
    container.program_tree_service.paste_element(&paste("LBIR1100", "1|2")).unwrap();
    container
        .program_tree_service
        .detach_node(&DetachNodeCommand {
            path_where_to_detach: "1|2|10".to_string(),
        })
        .unwrap();

    // Assert
    let after = get_tree(&container, "LBIR100B", YEAR);
    assert_eq!(after.identities(), before.identities());
    assert_eq!(after.get_all_links().len(), before.get_all_links().len());
}

#[rstest]
fn given_tree_when_duplicating_then_copy_is_independent() {
    // Arrange
    let tree = shared_learning_unit_tree();
    let field_rules = ConfigFieldValidationRules::from_settings(&Settings::default()).unwrap();
    let node_factory = NodeFactory::new(1_000_000);
    let builder = ProgramTreeBuilder::new(&node_factory, &field_rules);

    // Act
    let mut copy = builder.duplicate(&tree, Some(2025), None).unwrap();
    let root = copy.root();
    copy.node_mut(root).title = "Renamed".to_string();

    // Assert
    assert_eq!(copy.entity_id(), tree.entity_id());
    assert_ne!(copy.root_node().node_id, tree.root_node().node_id);
    assert_eq!(copy.root_node().end_year, Some(2025));
    assert_ne!(tree.root_node().title, "Renamed");
    let copied_codes: Vec<&str> = copy
        .root_node()
        .children
        .iter()
        .map(|link| copy.node(link.child).code.as_str())
        .collect();
    assert_eq!(copied_codes, vec!["LBIR101G"], "only mandatory children are duplicated");
}
