//! Link updates, reordering, path search and deletion of whole trees.

mod common;

use progtree::application::{DeleteProgramTreeCommand, OrderLinkCommand, UpdateLinkCommand};
use progtree::domain::repository::ProgramTreeRepository;
use progtree::domain::{
    AuthorizedRelationship, GroupType, LinkType, LinkUpdate, Node, NodeIdentity, NodeType, ProgramTreeIdentity,
    TrainingType,
};
use progtree::infrastructure::{InMemoryRepository, ServiceContainer};
use rstest::{fixture, rstest};

use common::{business_codes, container, get_tree, YEAR};

/// LBIR100B(1) > LBIR101G(2) > [LBIR1100(10), LBIR1200(11)], plus the bare tree LBIR200B(20) > LBIR201G(21)
#[fixture]
fn bachelor() -> ServiceContainer {
    let repository: InMemoryRepository = common::repository(vec![
        AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
        AuthorizedRelationship::new(GroupType::CommonCore, NodeType::LearningUnit, 0, 99),
    ]);
    common::store_tree(
        &repository,
        vec![
            Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor),
            Node::group(2, "LBIR101G", YEAR, GroupType::CommonCore),
            Node::learning_unit(10, "LBIR1100", YEAR),
            Node::learning_unit(11, "LBIR1200", YEAR),
        ],
        &[
            ("LBIR100B", "LBIR101G"),
            ("LBIR101G", "LBIR1100"),
            ("LBIR101G", "LBIR1200"),
        ],
    );
    common::store_tree(
        &repository,
        vec![
            Node::group(20, "LBIR200B", YEAR, TrainingType::Bachelor),
            Node::group(21, "LBIR201G", YEAR, GroupType::CommonCore),
        ],
        &[("LBIR200B", "LBIR201G")],
    );
    container(repository)
}

fn update(parent_path: &str, child: &str, change: impl FnOnce(&mut LinkUpdate)) -> UpdateLinkCommand {
    let mut update = LinkUpdate {
        relative_credits: None,
        access_condition: false,
        is_mandatory: true,
        block: None,
        link_type: None,
        comment: String::new(),
        comment_english: String::new(),
        quadrimester_derogation: None,
    };
    change(&mut update);
    UpdateLinkCommand {
        parent_node_path: parent_path.to_string(),
        child_node_code: child.to_string(),
        child_node_year: YEAR,
        update,
    }
}

#[rstest]
fn given_link_when_updating_block_and_credits_then_saved(bachelor: ServiceContainer) {
    // Act
    let link = bachelor
        .program_tree_service
        .update_link(&update("1|2", "LBIR1100", |u| {
            u.block = Some(12);
            u.relative_credits = Some(5);
            u.is_mandatory = false;
        }))
        .unwrap();

    // Assert
    assert_eq!(link.child(), NodeIdentity::new("LBIR1100", YEAR));
    let tree = get_tree(&bachelor, "LBIR100B", YEAR);
    let common_core = tree.get_node_by_path("1|2").unwrap();
    let unit = tree.find(&NodeIdentity::new("LBIR1100", YEAR)).unwrap();
    let attributes = &tree.get_link(common_core, unit).unwrap().attributes;
    assert_eq!(attributes.block, Some(12));
    assert_eq!(attributes.relative_credits, Some(5));
    assert!(!attributes.is_mandatory);
}

#[rstest]
fn given_invalid_block_when_updating_link_then_rejected_and_unchanged(bachelor: ServiceContainer) {
    // Act
    let error = bachelor
        .program_tree_service
        .update_link(&update("1|2", "LBIR1100", |u| u.block = Some(7)))
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["InvalidBlock"]);
    let tree = get_tree(&bachelor, "LBIR100B", YEAR);
    let unit = tree.find(&NodeIdentity::new("LBIR1100", YEAR)).unwrap();
    assert_eq!(tree.get_first_link_occurrence_using_node(unit).unwrap().attributes.block, None);
}

#[rstest]
fn given_mandatory_common_core_when_turning_link_into_reference_then_minimum_reached(bachelor: ServiceContainer) {
    // Act
    let error = bachelor
        .program_tree_service
        .update_link(&update("1", "LBIR101G", |u| u.link_type = Some(LinkType::Reference)))
        .unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&"MinimumChildTypesReached"), "{error}");
}

#[rstest]
fn given_learning_unit_when_setting_reference_link_then_rejected(bachelor: ServiceContainer) {
    // Act
    let error = bachelor
        .program_tree_service
        .update_link(&update("1|2", "LBIR1100", |u| u.link_type = Some(LinkType::Reference)))
        .unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&"ReferenceLinkNotAllowedWithLearningUnit"), "{error}");
}

#[rstest]
fn given_first_child_when_ordering_down_then_swapped_with_next(bachelor: ServiceContainer) {
    // Act
    bachelor
        .program_tree_service
        .order_down_link(&OrderLinkCommand {
            path: "1|2|10".to_string(),
        })
        .unwrap();

    // Assert
    let tree = get_tree(&bachelor, "LBIR100B", YEAR);
    let children = &tree.node(tree.get_node_by_path("1|2").unwrap()).children;
    let order: Vec<(&str, usize)> = children
        .iter()
        .map(|link| (tree.node(link.child).code.as_str(), link.order))
        .collect();
    assert_eq!(order, vec![("LBIR1200", 0), ("LBIR1100", 1)]);
}

#[rstest]
fn given_unit_in_tree_when_searching_paths_then_every_path_returned(bachelor: ServiceContainer) {
    // Act
    let paths = bachelor
        .program_tree_service
        .search_node_paths(
            &ProgramTreeIdentity::new("LBIR100B", YEAR),
            &NodeIdentity::new("LBIR1200", YEAR),
        )
        .unwrap();

    // Assert
    let paths: Vec<String> = paths.iter().map(ToString::to_string).collect();
    assert_eq!(paths, vec!["1|2|11"]);
}

#[rstest]
fn given_tree_with_learning_units_when_deleting_then_non_empty(bachelor: ServiceContainer) {
    // Act
    let error = bachelor
        .version_service
        .delete_program_tree(&DeleteProgramTreeCommand {
            code: "LBIR100B".to_string(),
            year: YEAR,
        })
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["ProgramTreeNonEmpty"]);
}

#[rstest]
fn given_tree_of_mandatory_groups_when_deleting_then_gone(bachelor: ServiceContainer) {
    // Act
    let deleted = bachelor
        .version_service
        .delete_program_tree(&DeleteProgramTreeCommand {
            code: "LBIR200B".to_string(),
            year: YEAR,
        })
        .unwrap();

    // Assert
    assert_eq!(deleted, ProgramTreeIdentity::new("LBIR200B", YEAR));
    let repository = bachelor.repository.as_ref();
    assert!(ProgramTreeRepository::get(repository, &deleted).is_err());
    assert!(ProgramTreeRepository::get(repository, &ProgramTreeIdentity::new("LBIR100B", YEAR)).is_ok());
}

#[rstest]
fn given_group_used_by_other_tree_when_deleting_its_tree_then_node_have_link(bachelor: ServiceContainer) {
    // Act
    let error = bachelor
        .version_service
        .delete_program_tree(&DeleteProgramTreeCommand {
            code: "LBIR201G".to_string(),
            year: YEAR,
        })
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["NodeHaveLink"]);
    let tree = get_tree(&bachelor, "LBIR200B", YEAR);
    assert!(tree.get_node_by_path("20|21").is_ok());
}
