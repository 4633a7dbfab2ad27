//! Domain-level errors (pure business logic, no I/O)

use std::fmt;

use thiserror::Error;

use crate::domain::identity::{NodeIdentity, ProgramTreeIdentity, ProgramTreeVersionIdentity};
use crate::domain::node_type::NodeType;

fn join<T: fmt::Display>(items: &[T]) -> String {
    itertools::join(items, ", ")
}

/// One broken business rule.
///
/// Each variant is a stable error kind; [`BusinessError::code`] returns its name.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BusinessError {
    // paste / structure
    #[error("cannot add a child to the learning unit {parent}")]
    ParentIsLeaf { parent: NodeIdentity },

    #[error("{child} is already a child of {parent}")]
    SameChildToParent {
        parent: NodeIdentity,
        child: NodeIdentity,
    },

    #[error("{child} and its parent {parent} must have the same academic year")]
    ParentAndChildDifferentAcademicYear {
        parent: NodeIdentity,
        child: NodeIdentity,
    },

    #[error("cannot attach {node}: it contains one of the parents of the target")]
    InfiniteRecursivity { node: NodeIdentity },

    #[error("cannot paste {node} into itself")]
    SelfPaste { node: NodeIdentity },

    #[error("{} not authorized as child of {parent} ({parent_type})", join(.child_types))]
    ChildTypeNotAuthorized {
        parent: NodeIdentity,
        parent_type: NodeType,
        child_types: Vec<NodeType>,
    },

    #[error("{parent} has reached the maximum number of children of type {}", join(.child_types))]
    MaximumChildTypesReached {
        parent: NodeIdentity,
        child_types: Vec<NodeType>,
    },

    #[error("a learning unit ({child}) cannot be attached by reference")]
    ReferenceLinkNotAllowedWithLearningUnit { child: NodeIdentity },

    #[error("{child} cannot be attached by reference under {parent}")]
    ReferenceLinkNotAllowed {
        parent: NodeIdentity,
        child: NodeIdentity,
    },

    #[error("{child} must be attached by reference under {parent}")]
    LinkShouldBeReference {
        parent: NodeIdentity,
        child: NodeIdentity,
    },

    #[error("invalid block value: {block}")]
    InvalidBlock { block: u32 },

    #[error("cannot modify a program of year {year}: editable from {limit}")]
    MinimumEditableYear { year: u32, limit: u32 },

    #[error("cannot paste into the learning unit {parent}")]
    CannotPasteToLearningUnit { parent: NodeIdentity },

    #[error("version of {node} ({found}) does not match the version of its parents ({expected})")]
    ProgramTreeVersionMismatch {
        node: NodeIdentity,
        expected: String,
        found: String,
    },

    // detach
    #[error("cannot detach the root {node} of a tree")]
    DetachRootForbidden { node: NodeIdentity },

    #[error("{parent} must keep a minimum number of children of type {}", join(.child_types))]
    MinimumChildTypesReached {
        parent: NodeIdentity,
        child_types: Vec<NodeType>,
    },

    #[error("cannot detach: {} used as prerequisite in {tree}", join(.learning_units))]
    CannotDetachLearningUnitsWhoArePrerequisite {
        tree: ProgramTreeIdentity,
        learning_units: Vec<String>,
    },

    #[error("cannot detach: {} have prerequisites in {tree}", join(.learning_units))]
    CannotDetachLearningUnitsWhoHavePrerequisite {
        tree: ProgramTreeIdentity,
        learning_units: Vec<String>,
    },

    #[error("cannot detach options {} still used in finality {finality}", join(.options))]
    CannotDetachOptionUsedInFinality {
        finality: String,
        options: Vec<String>,
    },

    // 2M invariants
    #[error("end year of {program} must be greater or equal than its finalities {}", join(.finalities))]
    Program2MEndDateShouldBeGreaterOrEqualThanItsFinalities {
        program: String,
        finalities: Vec<String>,
    },

    #[error("finalities {} end after {program}", join(.finalities))]
    CannotAttachFinalitiesWithGreaterEndDateThanProgram2M {
        program: String,
        finalities: Vec<String>,
    },

    #[error("options {} are not present in the option list of {program}", join(.options))]
    CannotAttachOptionIfNotPresentIn2MOptionList {
        program: String,
        options: Vec<String>,
    },

    // credits
    #[error("relative credits must be greater or equal than 0 (got {value})")]
    RelativeCreditShouldBeGreaterOrEqualsThanZero { value: i32 },

    #[error("relative credits must be lower or equal than 999 (got {value})")]
    RelativeCreditShouldBeLowerOrEqualThan999 { value: i32 },

    // prerequisites
    #[error("invalid prerequisite expression: {expression}")]
    PrerequisiteSyntaxInvalid { expression: String },

    #[error("unknown prerequisite codes in this tree: {}", join(.codes))]
    PrerequisiteUnknownCode { codes: Vec<String> },

    #[error("{code} cannot be a prerequisite of itself")]
    PrerequisiteOnSelf { code: String },

    // lookup
    #[error("invalid tree path: '{path}'")]
    InvalidTreePath { path: String },

    // copy / delete
    #[error("cannot copy {tree}: it ends in {end_year}")]
    CannotCopyTreeDueToEndDate {
        tree: ProgramTreeIdentity,
        end_year: u32,
    },

    #[error("cannot copy version {version}: it ends in {end_year}")]
    CannotCopyTreeVersionDueToEndDate {
        version: ProgramTreeVersionIdentity,
        end_year: u32,
    },

    #[error("cannot delete the standard version of {offer_acronym} ({year}): versions {} still exist", join(.versions))]
    CannotDeleteStandardDueToVersionEndDate {
        offer_acronym: String,
        year: u32,
        versions: Vec<String>,
    },

    #[error("program tree {tree} is not empty")]
    ProgramTreeNonEmpty { tree: ProgramTreeIdentity },

    #[error("{node} is still used in other trees")]
    NodeHaveLink { node: NodeIdentity },

    #[error("cannot extend {version}: transition {other_version_name} already exists in {year}")]
    CannotExtendTransitionDueToExistenceOfOtherTransition {
        version: ProgramTreeVersionIdentity,
        year: u32,
        other_version_name: String,
    },
}

impl BusinessError {
    /// Stable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            BusinessError::ParentIsLeaf { .. } => "ParentIsLeaf",
            BusinessError::SameChildToParent { .. } => "SameChildToParent",
            BusinessError::ParentAndChildDifferentAcademicYear { .. } => {
                "ParentAndChildDifferentAcademicYear"
            }
            BusinessError::InfiniteRecursivity { .. } => "InfiniteRecursivity",
            BusinessError::SelfPaste { .. } => "SelfPaste",
            BusinessError::ChildTypeNotAuthorized { .. } => "ChildTypeNotAuthorized",
            BusinessError::MaximumChildTypesReached { .. } => "MaximumChildTypesReached",
            BusinessError::ReferenceLinkNotAllowedWithLearningUnit { .. } => {
                "ReferenceLinkNotAllowedWithLearningUnit"
            }
            BusinessError::ReferenceLinkNotAllowed { .. } => "ReferenceLinkNotAllowed",
            BusinessError::LinkShouldBeReference { .. } => "LinkShouldBeReference",
            BusinessError::InvalidBlock { .. } => "InvalidBlock",
            BusinessError::MinimumEditableYear { .. } => "MinimumEditableYear",
            BusinessError::CannotPasteToLearningUnit { .. } => "CannotPasteToLearningUnit",
            BusinessError::ProgramTreeVersionMismatch { .. } => "ProgramTreeVersionMismatch",
            BusinessError::DetachRootForbidden { .. } => "DetachRootForbidden",
            BusinessError::MinimumChildTypesReached { .. } => "MinimumChildTypesReached",
            BusinessError::CannotDetachLearningUnitsWhoArePrerequisite { .. } => {
                "CannotDetachLearningUnitsWhoArePrerequisite"
            }
            BusinessError::CannotDetachLearningUnitsWhoHavePrerequisite { .. } => {
                "CannotDetachLearningUnitsWhoHavePrerequisite"
            }
            BusinessError::CannotDetachOptionUsedInFinality { .. } => {
                "CannotDetachOptionUsedInFinality"
            }
            BusinessError::Program2MEndDateShouldBeGreaterOrEqualThanItsFinalities { .. } => {
                "Program2MEndDateShouldBeGreaterOrEqualThanItsFinalities"
            }
            BusinessError::CannotAttachFinalitiesWithGreaterEndDateThanProgram2M { .. } => {
                "CannotAttachFinalitiesWithGreaterEndDateThanProgram2M"
            }
            BusinessError::CannotAttachOptionIfNotPresentIn2MOptionList { .. } => {
                "CannotAttachOptionIfNotPresentIn2MOptionList"
            }
            BusinessError::RelativeCreditShouldBeGreaterOrEqualsThanZero { .. } => {
                "RelativeCreditShouldBeGreaterOrEqualsThanZero"
            }
            BusinessError::RelativeCreditShouldBeLowerOrEqualThan999 { .. } => {
                "RelativeCreditShouldBeLowerOrEqualThan999"
            }
            BusinessError::PrerequisiteSyntaxInvalid { .. } => "PrerequisiteSyntaxInvalid",
            BusinessError::PrerequisiteUnknownCode { .. } => "PrerequisiteUnknownCode",
            BusinessError::PrerequisiteOnSelf { .. } => "PrerequisiteOnSelf",
            BusinessError::InvalidTreePath { .. } => "InvalidTreePath",
            BusinessError::CannotCopyTreeDueToEndDate { .. } => "CannotCopyTreeDueToEndDate",
            BusinessError::CannotCopyTreeVersionDueToEndDate { .. } => {
                "CannotCopyTreeVersionDueToEndDate"
            }
            BusinessError::CannotDeleteStandardDueToVersionEndDate { .. } => {
                "CannotDeleteStandardDueToVersionEndDate"
            }
            BusinessError::ProgramTreeNonEmpty { .. } => "ProgramTreeNonEmpty",
            BusinessError::NodeHaveLink { .. } => "NodeHaveLink",
            BusinessError::CannotExtendTransitionDueToExistenceOfOtherTransition { .. } => {
                "CannotExtendTransitionDueToExistenceOfOtherTransition"
            }
        }
    }
}

/// Ordered list of broken business rules, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessErrors(Vec<BusinessError>);

impl BusinessErrors {
    pub fn new(errors: Vec<BusinessError>) -> Self {
        Self(errors)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BusinessError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Error kinds in reporting order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.0.iter().map(BusinessError::code).collect()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code() == code)
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for BusinessErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", itertools::join(&self.0, "; "))
    }
}

impl std::error::Error for BusinessErrors {}

impl From<BusinessError> for BusinessErrors {
    fn from(value: BusinessError) -> Self {
        Self(vec![value])
    }
}

impl IntoIterator for BusinessErrors {
    type Item = BusinessError;
    type IntoIter = std::vec::IntoIter<BusinessError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Domain errors represent business logic failures.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Business(#[from] BusinessErrors),

    #[error("node not found: {path}")]
    NodeNotFound { path: String },

    #[error("program tree not found: {0}")]
    ProgramTreeNotFound(ProgramTreeIdentity),

    #[error("program tree version not found: {0}")]
    ProgramTreeVersionNotFound(ProgramTreeVersionIdentity),

    #[error("program tree already exists: {0}")]
    ProgramTreeAlreadyExists(ProgramTreeIdentity),

    #[error("program tree version already exists: {0}")]
    ProgramTreeVersionAlreadyExists(ProgramTreeVersionIdentity),

    #[error("not a standard version: {0}")]
    NotAStandardVersion(ProgramTreeVersionIdentity),

    #[error("no free code left to generate a child of {parent_code}")]
    CodeGenerationFailed { parent_code: String },

    #[error("repository failure: {context}")]
    Repository { context: String },
}

impl From<BusinessError> for DomainError {
    fn from(value: BusinessError) -> Self {
        DomainError::Business(value.into())
    }
}

impl DomainError {
    pub fn business_errors(&self) -> Option<&BusinessErrors> {
        match self {
            DomainError::Business(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_single_error_when_converting_then_business_list_has_one_code() {
        let err: DomainError = BusinessError::InvalidBlock { block: 7 }.into();
        assert_eq!(err.business_errors().map(|e| e.codes()), Some(vec!["InvalidBlock"]));
    }

    #[test]
    fn given_type_list_when_displaying_then_types_are_joined() {
        let err = BusinessError::MaximumChildTypesReached {
            parent: NodeIdentity::new("LBIR100B", 2020),
            child_types: vec![
                crate::domain::node_type::GroupType::CommonCore.into(),
                crate::domain::node_type::GroupType::SubGroup.into(),
            ],
        };
        assert!(err.to_string().contains("COMMON_CORE, SUB_GROUP"));
    }
}
