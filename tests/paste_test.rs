//! Pasting stored nodes into program trees through the application service.

mod common;

use progtree::application::PasteElementCommand;
use progtree::domain::{
    AuthorizedRelationship, GroupType, LinkType, MiniTrainingType, Node, NodeIdentity, NodeType, PasteCommand,
    TrainingType,
};
use progtree::infrastructure::InMemoryRepository;
use rstest::{fixture, rstest};

use common::{business_codes, container, get_tree, YEAR};

fn paste(code: &str, path: &str) -> PasteElementCommand {
    PasteElementCommand {
        node_to_paste_code: code.to_string(),
        node_to_paste_year: YEAR,
        paste: PasteCommand::new(path),
    }
}

#[fixture]
fn bachelor() -> InMemoryRepository {
    let repository = common::repository(vec![
        AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
        AuthorizedRelationship::new(GroupType::CommonCore, NodeType::LearningUnit, 0, 99),
    ]);
    common::store_tree(
        &repository,
        vec![Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor).with_title("BIR1BA")],
        &[],
    );
    repository.insert_node(Node::group(2, "LBIR150T", YEAR, GroupType::CommonCore));
    repository.insert_node(Node::group(3, "LBIR151T", YEAR, GroupType::CommonCore));
    repository.insert_node(Node::learning_unit(4, "LBIR1100", YEAR));
    repository.insert_node(Node::group(5, "LBIR160T", 2021, GroupType::CommonCore));
    repository
}

#[rstest]
fn given_empty_bachelor_when_pasting_common_core_then_first_child(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);

    // Act
    let link = container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();

    // Assert
    assert_eq!(link.child().code, "LBIR150T");
    let tree = get_tree(&container, "LBIR100B", YEAR);
    let children = &tree.root_node().children;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].order, 0);
    assert_eq!(tree.node(children[0].child).node_type, NodeType::from(GroupType::CommonCore));
}

#[rstest]
fn given_common_core_present_when_pasting_another_then_maximum_reached(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();

    // Act
    let error = container
        .program_tree_service
        .paste_element(&paste("LBIR151T", "1"))
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["MaximumChildTypesReached"]);
    let tree = get_tree(&container, "LBIR100B", YEAR);
    assert_eq!(tree.root_node().children.len(), 1, "rejected paste must not be saved");
}

#[rstest]
fn given_learning_unit_when_pasting_by_reference_then_rejected(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();
    let mut command = paste("LBIR1100", "1|2");
    command.paste.link_type = Some(LinkType::Reference);

    // Act
    let error = container.program_tree_service.paste_element(&command).unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["ReferenceLinkNotAllowedWithLearningUnit"]);
}

#[rstest]
#[case(Some(7), None, "InvalidBlock")]
#[case(None, Some(-1), "RelativeCreditShouldBeGreaterOrEqualsThanZero")]
#[case(None, Some(1000), "RelativeCreditShouldBeLowerOrEqualThan999")]
fn given_invalid_link_attributes_when_pasting_then_rejected(
    bachelor: InMemoryRepository,
    #[case] block: Option<u32>,
    #[case] relative_credits: Option<i32>,
    #[case] expected: &str,
) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();
    let mut command = paste("LBIR1100", "1|2");
    command.paste.block = block;
    command.paste.relative_credits = relative_credits;

    // Act
    let error = container.program_tree_service.paste_element(&command).unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec![expected]);
}

#[rstest]
fn given_group_of_other_year_when_pasting_then_different_academic_year(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    let command = PasteElementCommand {
        node_to_paste_year: 2021,
        ..paste("LBIR160T", "1")
    };

    // Act
    let error = container.program_tree_service.paste_element(&command).unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&"ParentAndChildDifferentAcademicYear"));
}

#[rstest]
fn given_learning_unit_as_parent_when_pasting_then_parent_is_leaf(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();
    container.program_tree_service.paste_element(&paste("LBIR1100", "1|2")).unwrap();

    // Act
    let error = container
        .program_tree_service
        .paste_element(&paste("LBIR151T", "1|2|4"))
        .unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&"ParentIsLeaf"));
}

#[rstest]
fn given_same_child_when_pasting_twice_then_duplicate_rejected(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();
    container.program_tree_service.paste_element(&paste("LBIR1100", "1|2")).unwrap();

    // Act
    let error = container
        .program_tree_service
        .paste_element(&paste("LBIR1100", "1|2"))
        .unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&"SameChildToParent"));
}

#[test]
fn given_minor_list_choice_when_pasting_minor_then_link_forced_to_reference() {
    // Arrange
    let repository = common::repository(vec![
        AuthorizedRelationship::new(TrainingType::PgrmMaster120, GroupType::MinorListChoice, 0, 1),
        AuthorizedRelationship::new(GroupType::MinorListChoice, MiniTrainingType::AccessMinor, 0, 99),
    ]);
    common::store_tree(
        &repository,
        vec![
            Node::group(1, "LDROI200M", YEAR, TrainingType::PgrmMaster120),
            Node::group(2, "LDROI101G", YEAR, GroupType::MinorListChoice),
        ],
        &[("LDROI200M", "LDROI101G")],
    );
    repository.insert_node(Node::group(3, "MY_MINOR", YEAR, MiniTrainingType::AccessMinor));
    let container = container(repository);
    let command = paste("MY_MINOR", "1|2");
    assert_eq!(command.paste.link_type, None);

    // Act
    container.program_tree_service.paste_element(&command).unwrap();

    // Assert
    let tree = get_tree(&container, "LDROI200M", YEAR);
    let list = tree.get_node_by_path("1|2").unwrap();
    let minor = tree.get_node_by_path("1|2|3").unwrap();
    assert!(tree.get_link(list, minor).unwrap().is_reference());
}

#[test]
fn given_cut_between_trees_when_pasting_then_both_trees_saved() {
    // Arrange
    let repository = common::repository(vec![
        AuthorizedRelationship::new(TrainingType::Bachelor, GroupType::CommonCore, 1, 1),
        AuthorizedRelationship::new(GroupType::CommonCore, NodeType::LearningUnit, 0, 99),
    ]);
    common::store_tree(
        &repository,
        vec![
            Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor),
            Node::group(2, "LBIR101G", YEAR, GroupType::CommonCore),
            Node::learning_unit(3, "LBIR1100", YEAR),
        ],
        &[("LBIR100B", "LBIR101G"), ("LBIR101G", "LBIR1100")],
    );
    common::store_tree(
        &repository,
        vec![
            Node::group(11, "LAGRO100B", YEAR, TrainingType::Bachelor),
            Node::group(12, "LAGRO101G", YEAR, GroupType::CommonCore),
        ],
        &[("LAGRO100B", "LAGRO101G")],
    );
    let container = container(repository);
    let mut command = paste("LBIR1100", "11|12");
    command.paste.path_where_to_detach = Some("1|2|3".to_string());

    // Act
    container.program_tree_service.paste_element(&command).unwrap();

    // Assert
    let source = get_tree(&container, "LBIR100B", YEAR);
    let target = get_tree(&container, "LAGRO100B", YEAR);
    assert!(source.find(&NodeIdentity::new("LBIR1100", YEAR)).is_none());
    assert!(target.get_node_by_path("11|12|3").is_ok());
}

#[rstest]
fn given_common_core_when_pasting_it_into_itself_then_self_paste(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();

    // Act
    let error = container
        .program_tree_service
        .paste_element(&paste("LBIR150T", "1|2"))
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["SelfPaste"]);
}

#[rstest]
fn given_root_when_pasting_it_under_its_child_then_infinite_recursivity(bachelor: InMemoryRepository) {
    // Arrange
    let container = container(bachelor);
    container.program_tree_service.paste_element(&paste("LBIR150T", "1")).unwrap();

    // Act
    let error = container
        .program_tree_service
        .paste_element(&paste("LBIR100B", "1|2"))
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["InfiniteRecursivity"]);
    let tree = get_tree(&container, "LBIR100B", YEAR);
    assert!(tree.node(tree.get_node_by_path("1|2").unwrap()).children.is_empty());
}

#[rstest]
fn given_tree_before_editable_year_when_pasting_then_rejected() {
    // Arrange
    let repository = common::repository(vec![AuthorizedRelationship::new(
        TrainingType::Bachelor,
        GroupType::CommonCore,
        1,
        1,
    )]);
    common::store_tree(
        &repository,
        vec![Node::group(1, "LBIR100B", 2018, TrainingType::Bachelor)],
        &[],
    );
    repository.insert_node(Node::group(2, "LBIR150T", 2018, GroupType::CommonCore));
    let container = container(repository);
    let command = PasteElementCommand {
        node_to_paste_year: 2018,
        ..paste("LBIR150T", "1")
    };

    // Act
    let error = container.program_tree_service.paste_element(&command).unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["MinimumEditableYear"]);
}
