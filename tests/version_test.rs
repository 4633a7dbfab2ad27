//! Standard and specific versions of an offer and the trees behind them.

mod common;

use progtree::application::{
    CreateSpecificVersionCommand, CreateStandardVersionCommand, DeleteProgramTreeVersionCommand,
    PostponeProgramTreeVersionCommand, UpdateProgramTreeVersionCommand,
};
use progtree::domain::repository::{ProgramTreeRepository, ProgramTreeVersionRepository};
use progtree::domain::service::ProgramTreeVersionIdentitySearch;
use progtree::domain::{
    AuthorizedRelationship, GroupType, Node, NodeIdentity, ProgramTreeIdentity, ProgramTreeVersion,
    ProgramTreeVersionIdentity, TrainingType,
};
use progtree::infrastructure::ServiceContainer;
use rstest::{fixture, rstest};

use common::{business_codes, container, get_tree, YEAR};

const OFFER: &str = "BIR1BA";

/// Container with the standard version of BIR1BA created on the orphan root LBIR100B.
#[fixture]
fn standard() -> ServiceContainer {
    let repository = common::repository(vec![AuthorizedRelationship::new(
        TrainingType::Bachelor,
        GroupType::CommonCore,
        1,
        1,
    )]);
    repository.insert_node(Node::group(1, "LBIR100B", YEAR, TrainingType::Bachelor).with_title("BIR1BA"));
    let container = container(repository);
    container
        .version_service
        .create_standard_version(&CreateStandardVersionCommand {
            offer_acronym: OFFER.to_string(),
            code: "LBIR100B".to_string(),
            year: YEAR,
            title_fr: Some("Bachelier en bioingénieur".to_string()),
            title_en: None,
            end_year_of_existence: None,
        })
        .unwrap();
    container
}

fn specific(name: &str, end_year: Option<u32>) -> CreateSpecificVersionCommand {
    CreateSpecificVersionCommand {
        offer_acronym: OFFER.to_string(),
        year: YEAR,
        version_name: name.to_string(),
        is_transition: false,
        title_fr: None,
        title_en: None,
        end_year_of_existence: end_year,
    }
}

fn cems() -> ProgramTreeVersionIdentity {
    ProgramTreeVersionIdentity::new(OFFER, YEAR, "CEMS", false)
}

#[rstest]
fn given_orphan_root_when_creating_standard_version_then_mandatory_children_generated(standard: ServiceContainer) {
    // Act
    let tree = get_tree(&standard, "LBIR100B", YEAR);

    // Assert
    let children = &tree.root_node().children;
    assert_eq!(children.len(), 1);
    let common_core = tree.node(children[0].child);
    assert_eq!(common_core.code, "LBIR101G");
    assert_eq!(common_core.year, YEAR);
    let version =
        ProgramTreeVersionRepository::get(standard.repository.as_ref(), &ProgramTreeVersionIdentity::standard(OFFER, YEAR))
            .unwrap();
    assert_eq!(version.program_tree_identity, ProgramTreeIdentity::new("LBIR100B", YEAR));
}

#[rstest]
fn given_standard_version_when_creating_specific_then_tree_copied_under_new_codes(standard: ServiceContainer) {
    // Act
    let identity = standard.version_service.create_specific_version(&specific("cems", None)).unwrap();

    // Assert
    assert_eq!(identity, cems());
    let version = ProgramTreeVersionRepository::get(standard.repository.as_ref(), &identity).unwrap();
    assert_eq!(version.program_tree_identity, ProgramTreeIdentity::new("LBIR101B", YEAR));
    let tree = get_tree(&standard, "LBIR101B", YEAR);
    assert_eq!(tree.root_node().version_name(), "CEMS");
    assert!(tree.contains(&NodeIdentity::new("LBIR102G", YEAR)));
}

#[rstest]
fn given_specific_version_when_creating_it_again_then_already_exists(standard: ServiceContainer) {
    // Arrange
    standard.version_service.create_specific_version(&specific("CEMS", None)).unwrap();
    let trees = standard.repository.tree_identities();
    let nodes = standard.repository.node_count();

    // Act
    let result = standard.version_service.create_specific_version(&specific("cems", None));

    // Assert
    assert!(result.is_err());
    assert_eq!(standard.repository.tree_identities(), trees);
    assert_eq!(standard.repository.node_count(), nodes);
}

#[rstest]
fn given_specific_version_when_deleting_standard_then_rejected(standard: ServiceContainer) {
    // Arrange
    standard.version_service.create_specific_version(&specific("cems", None)).unwrap();

    // Act
    let error = standard
        .version_service
        .delete_program_tree_version(&DeleteProgramTreeVersionCommand {
            identity: ProgramTreeVersionIdentity::standard(OFFER, YEAR),
        })
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["CannotDeleteStandardDueToVersionEndDate"]);
    assert!(ProgramTreeRepository::get(standard.repository.as_ref(), &ProgramTreeIdentity::new("LBIR100B", YEAR)).is_ok());
}

#[rstest]
fn given_specific_version_when_deleting_it_then_its_tree_is_gone(standard: ServiceContainer) {
    // Arrange
    standard.version_service.create_specific_version(&specific("cems", None)).unwrap();

    // Act
    standard
        .version_service
        .delete_program_tree_version(&DeleteProgramTreeVersionCommand { identity: cems() })
        .unwrap();

    // Assert
    let repository = standard.repository.as_ref();
    assert!(ProgramTreeVersionRepository::get(repository, &cems()).is_err());
    assert!(ProgramTreeRepository::get(repository, &ProgramTreeIdentity::new("LBIR101B", YEAR)).is_err());
    assert!(ProgramTreeRepository::get(repository, &ProgramTreeIdentity::new("LBIR100B", YEAR)).is_ok());
}

#[rstest]
fn given_specific_version_when_postponing_then_copied_until_its_end(standard: ServiceContainer) {
    // Arrange
    standard
        .version_service
        .create_specific_version(&specific("cems", Some(2021)))
        .unwrap();

    // Act
    let created = standard
        .postponement_service
        .postpone_program_tree_version(&PostponeProgramTreeVersionCommand { from: cems() })
        .unwrap();

    // Assert
    assert_eq!(created, vec![cems().at_year(2021)]);
    let next = get_tree(&standard, "LBIR101B", 2021);
    assert!(next.contains(&NodeIdentity::new("LBIR102G", 2021)));
}

#[rstest]
fn given_standard_version_when_updating_end_year_then_tree_root_follows(standard: ServiceContainer) {
    // Act
    standard
        .version_service
        .update_program_tree_version(&UpdateProgramTreeVersionCommand {
            identity: ProgramTreeVersionIdentity::standard(OFFER, YEAR),
            title_fr: Some("Bachelier en bioingénieur".to_string()),
            title_en: Some("Bachelor in bioengineering".to_string()),
            end_year_of_existence: Some(2024),
        })
        .unwrap();

    // Assert
    let version =
        ProgramTreeVersionRepository::get(standard.repository.as_ref(), &ProgramTreeVersionIdentity::standard(OFFER, YEAR))
            .unwrap();
    assert_eq!(version.end_year_of_existence, Some(2024));
    assert_eq!(version.title_en.as_deref(), Some("Bachelor in bioengineering"));
    assert_eq!(get_tree(&standard, "LBIR100B", YEAR).root_node().end_year, Some(2024));
}

#[rstest]
fn given_specific_version_when_searching_from_its_root_then_version_found(standard: ServiceContainer) {
    // Arrange
    standard.version_service.create_specific_version(&specific("cems", None)).unwrap();
    let search = ProgramTreeVersionIdentitySearch::new(standard.repository.as_ref());

    // Act
    let identity = search
        .get_from_node_identity(&NodeIdentity::new("LBIR101B", YEAR))
        .unwrap();

    // Assert
    assert_eq!(identity, cems());
    assert_eq!(
        search.get_tree_identity(&identity).unwrap(),
        ProgramTreeIdentity::new("LBIR101B", YEAR)
    );
}

#[rstest]
fn given_standard_version_when_creating_another_standard_then_nothing_stored(standard: ServiceContainer) {
    // Arrange
    standard
        .repository
        .insert_node(Node::group(20, "LBIR200B", YEAR, TrainingType::Bachelor));

    // Act
    let result = standard.version_service.create_standard_version(&CreateStandardVersionCommand {
        offer_acronym: OFFER.to_string(),
        code: "LBIR200B".to_string(),
        year: YEAR,
        title_fr: None,
        title_en: None,
        end_year_of_existence: None,
    });

    // Assert
    assert!(result.is_err());
    assert_eq!(
        standard.repository.tree_identities(),
        vec![ProgramTreeIdentity::new("LBIR100B", YEAR)]
    );
    assert!(get_tree(&standard, "LBIR200B", YEAR).root_node().children.is_empty());
}

#[rstest]
fn given_other_transition_next_year_when_postponing_transition_then_rejected(standard: ServiceContainer) {
    // Arrange
    let transition = standard
        .version_service
        .create_specific_version(&CreateSpecificVersionCommand {
            is_transition: true,
            ..specific("TRANS1", Some(2022))
        })
        .unwrap();
    ProgramTreeVersionRepository::create(
        standard.repository.as_ref(),
        &ProgramTreeVersion {
            entity_identity: ProgramTreeVersionIdentity::new(OFFER, 2021, "TRANS2", true),
            program_tree_identity: ProgramTreeIdentity::new("LBIR102B", 2021),
            title_fr: None,
            title_en: None,
            start_year: 2021,
            end_year_of_existence: None,
        },
    )
    .unwrap();

    // Act
    let error = standard
        .postponement_service
        .postpone_program_tree_version(&PostponeProgramTreeVersionCommand { from: transition })
        .unwrap_err();

    // Assert
    assert_eq!(
        business_codes(&error),
        vec!["CannotExtendTransitionDueToExistenceOfOtherTransition"]
    );
    assert!(ProgramTreeRepository::get(standard.repository.as_ref(), &ProgramTreeIdentity::new("LBIR101B", 2021)).is_err());
}

#[rstest]
fn given_version_ending_this_year_when_postponing_then_rejected(standard: ServiceContainer) {
    // Arrange
    standard
        .version_service
        .create_specific_version(&specific("cems", Some(YEAR)))
        .unwrap();

    // Act
    let error = standard
        .postponement_service
        .postpone_program_tree_version(&PostponeProgramTreeVersionCommand { from: cems() })
        .unwrap_err();

    // Assert
    assert_eq!(business_codes(&error), vec!["CannotCopyTreeVersionDueToEndDate"]);
}
