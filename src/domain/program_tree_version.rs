//! Named versions of an offer's program tree: the standard one, specific ones
//! and transitions.

use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::{ProgramTreeIdentity, ProgramTreeVersionIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTreeVersion {
    pub entity_identity: ProgramTreeVersionIdentity,
    pub program_tree_identity: ProgramTreeIdentity,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub start_year: u32,
    pub end_year_of_existence: Option<u32>,
}

impl ProgramTreeVersion {
    pub fn entity_id(&self) -> &ProgramTreeVersionIdentity {
        &self.entity_identity
    }

    pub fn is_standard(&self) -> bool {
        self.entity_identity.is_standard()
    }

    pub fn is_transition(&self) -> bool {
        self.entity_identity.is_transition
    }

    pub fn version_name(&self) -> &str {
        &self.entity_identity.version_name
    }

    pub fn offer_acronym(&self) -> &str {
        &self.entity_identity.offer_acronym
    }

    pub fn year(&self) -> u32 {
        self.entity_identity.year
    }

    /// Label shared by every year of this version.
    pub fn version_label(&self) -> String {
        self.entity_identity.version_label()
    }
}

/// What the user chooses when deriving a version from the standard one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVersionAttributes {
    pub version_name: String,
    pub is_transition: bool,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub end_year_of_existence: Option<u32>,
}

#[derive(Debug, Default)]
pub struct ProgramTreeVersionBuilder;

impl ProgramTreeVersionBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_standard_version(
        &self,
        tree_identity: ProgramTreeIdentity,
        offer_acronym: &str,
    ) -> ProgramTreeVersion {
        ProgramTreeVersion {
            entity_identity: ProgramTreeVersionIdentity::standard(offer_acronym, tree_identity.year),
            start_year: tree_identity.year,
            program_tree_identity: tree_identity,
            title_fr: None,
            title_en: None,
            end_year_of_existence: None,
        }
    }

    /// Version derived from `standard`, attached to `tree_identity`.
    pub fn build_from(
        &self,
        standard: &ProgramTreeVersion,
        attributes: NewVersionAttributes,
        tree_identity: ProgramTreeIdentity,
    ) -> DomainResult<ProgramTreeVersion> {
        if !standard.is_standard() {
            return Err(DomainError::NotAStandardVersion(standard.entity_identity.clone()));
        }
        let identity = ProgramTreeVersionIdentity::new(
            standard.offer_acronym(),
            standard.year(),
            attributes.version_name.to_uppercase(),
            attributes.is_transition,
        );
        if identity.is_standard() {
            return Err(DomainError::ProgramTreeVersionAlreadyExists(identity));
        }
        debug!(version = %identity, "building specific version");
        Ok(ProgramTreeVersion {
            entity_identity: identity,
            program_tree_identity: tree_identity,
            title_fr: attributes.title_fr,
            title_en: attributes.title_en,
            start_year: standard.year(),
            end_year_of_existence: attributes.end_year_of_existence,
        })
    }

    /// Same version one year later, on the tree of that year.
    pub fn copy_to_next_year(&self, from: &ProgramTreeVersion) -> ProgramTreeVersion {
        ProgramTreeVersion {
            entity_identity: from.entity_identity.at_year(from.year() + 1),
            program_tree_identity: from.program_tree_identity.next_year(),
            ..from.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ProgramTreeVersion {
        ProgramTreeVersionBuilder::new()
            .build_standard_version(ProgramTreeIdentity::new("LDROI200M", 2020), "DROI2M")
    }

    #[test]
    fn given_standard_when_building_specific_then_name_uppercased() {
        // Arrange
        let attributes = NewVersionAttributes {
            version_name: "cems".to_string(),
            end_year_of_existence: Some(2024),
            ..Default::default()
        };

        // Act
        let version = ProgramTreeVersionBuilder::new()
            .build_from(&standard(), attributes, ProgramTreeIdentity::new("LDROI201M", 2020))
            .unwrap();

        // Assert
        assert_eq!(version.version_name(), "CEMS");
        assert!(!version.is_standard());
        assert_eq!(version.offer_acronym(), "DROI2M");
        assert_eq!(version.end_year_of_existence, Some(2024));
    }

    #[test]
    fn given_specific_source_when_building_then_not_a_standard_version() {
        // Arrange
        let builder = ProgramTreeVersionBuilder::new();
        let specific = builder
            .build_from(
                &standard(),
                NewVersionAttributes {
                    version_name: "CEMS".to_string(),
                    ..Default::default()
                },
                ProgramTreeIdentity::new("LDROI201M", 2020),
            )
            .unwrap();

        // Act
        let result = builder.build_from(
            &specific,
            NewVersionAttributes::default(),
            ProgramTreeIdentity::new("LDROI202M", 2020),
        );

        // Assert
        assert!(matches!(result, Err(DomainError::NotAStandardVersion(_))));
    }

    #[test]
    fn given_version_when_copying_to_next_year_then_tree_follows() {
        let next = ProgramTreeVersionBuilder::new().copy_to_next_year(&standard());
        assert_eq!(next.year(), 2021);
        assert_eq!(next.program_tree_identity, ProgramTreeIdentity::new("LDROI200M", 2021));
        assert_eq!(next.start_year, 2020);
    }
}
