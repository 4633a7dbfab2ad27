//! Setting prerequisites of learning units through the application service.

mod common;

use progtree::application::SetPrerequisiteCommand;
use progtree::domain::prerequisite::{Language, Operator};
use progtree::domain::{GroupType, Node, NodeIdentity, TrainingType};
use progtree::infrastructure::InMemoryRepository;
use rstest::{fixture, rstest};

use common::{business_codes, container, get_tree, YEAR};

fn set(expression: &str, node_code: &str) -> SetPrerequisiteCommand {
    SetPrerequisiteCommand {
        prerequisite_string: expression.to_string(),
        node_code: node_code.to_string(),
        node_year: YEAR,
        program_tree_root_code: "LDROI100B".to_string(),
        program_tree_root_year: YEAR,
    }
}

#[fixture]
fn law() -> InMemoryRepository {
    let repository = common::repository(vec![]);
    common::store_tree(
        &repository,
        vec![
            Node::group(1, "LDROI100B", YEAR, TrainingType::Bachelor),
            Node::group(2, "LDROI101T", YEAR, GroupType::CommonCore),
            Node::learning_unit(3, "LDROI1300", YEAR),
            Node::learning_unit(4, "LAGRO2400", YEAR),
            Node::learning_unit(5, "LBIR5600", YEAR),
            Node::learning_unit(6, "LDROI2101", YEAR),
        ],
        &[
            ("LDROI100B", "LDROI101T"),
            ("LDROI101T", "LDROI1300"),
            ("LDROI101T", "LAGRO2400"),
            ("LDROI101T", "LBIR5600"),
            ("LDROI101T", "LDROI2101"),
        ],
    );
    repository
}

#[rstest]
fn given_known_codes_when_setting_prerequisite_then_stored_in_tree(law: InMemoryRepository) {
    // Arrange
    let container = container(law);

    // Act
    let node = container
        .program_tree_service
        .set_prerequisite(&set("LDROI1300 ET (LAGRO2400 OU LBIR5600)", "LDROI2101"))
        .unwrap();

    // Assert
    assert_eq!(node, NodeIdentity::new("LDROI2101", YEAR));
    let tree = get_tree(&container, "LDROI100B", YEAR);
    let prerequisite = tree.prerequisites().get(&node).expect("prerequisite stored");
    assert_eq!(prerequisite.main_operator, Operator::And);
    assert_eq!(prerequisite.groups.len(), 2);
    assert_eq!(
        prerequisite.to_expression(Language::En),
        "LDROI1300 AND (LAGRO2400 OR LBIR5600)"
    );
}

#[rstest]
fn given_lowercase_expression_when_setting_prerequisite_then_codes_uppercased(law: InMemoryRepository) {
    // Arrange
    let container = container(law);

    // Act
    container
        .program_tree_service
        .set_prerequisite(&set("ldroi1300 ou lagro2400", "LDROI2101"))
        .unwrap();

    // Assert
    let tree = get_tree(&container, "LDROI100B", YEAR);
    let prerequisite = tree
        .prerequisites()
        .get(&NodeIdentity::new("LDROI2101", YEAR))
        .unwrap();
    assert_eq!(prerequisite.main_operator, Operator::Or);
    assert!(prerequisite.has_item("LAGRO2400"));
}

#[rstest]
fn given_existing_prerequisite_when_setting_empty_expression_then_removed(law: InMemoryRepository) {
    // Arrange
    let container = container(law);
    container
        .program_tree_service
        .set_prerequisite(&set("LDROI1300", "LDROI2101"))
        .unwrap();

    // Act
    container.program_tree_service.set_prerequisite(&set("", "LDROI2101")).unwrap();

    // Assert
    let tree = get_tree(&container, "LDROI100B", YEAR);
    assert!(!tree.prerequisites().is_prerequisite("LDROI1300"));
}

#[rstest]
#[case("LDROI1300 ET LOSIS1111", "PrerequisiteUnknownCode")]
#[case("LDROI1300 OU LDROI2101", "PrerequisiteOnSelf")]
#[case("LDROI1300 ET OU LAGRO2400", "PrerequisiteSyntaxInvalid")]
#[case("(LDROI1300 ET LAGRO2400", "PrerequisiteSyntaxInvalid")]
fn given_invalid_expression_when_setting_prerequisite_then_rejected(
    law: InMemoryRepository,
    #[case] expression: &str,
    #[case] expected: &str,
) {
    // Arrange
    let container = container(law);

    // Act
    let error = container
        .program_tree_service
        .set_prerequisite(&set(expression, "LDROI2101"))
        .unwrap_err();

    // Assert
    assert!(business_codes(&error).contains(&expected), "{error}");
    let tree = get_tree(&container, "LDROI100B", YEAR);
    assert!(tree.prerequisites().is_empty(), "rejected prerequisite must not be saved");
}

#[rstest]
fn given_group_node_when_setting_prerequisite_then_error(law: InMemoryRepository) {
    // Arrange
    let container = container(law);

    // Act
    let result = container
        .program_tree_service
        .set_prerequisite(&set("LDROI1300", "LDROI101T"));

    // Assert
    assert!(result.is_err());
}
