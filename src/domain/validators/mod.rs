//! Business validators and their composition into per-action lists.

mod authorized_relationship;
mod business_action;
mod finality;
mod prerequisite;
mod structure;
mod version;

use tracing::debug;

use crate::domain::error::{BusinessError, BusinessErrors, DomainError, DomainResult};

pub use authorized_relationship::{
    AuthorizedRelationshipLearningUnitValidator, AuthorizedRelationshipValidator,
    DetachAuthorizedRelationshipValidator, PasteAuthorizedRelationshipValidator,
    UpdateLinkAuthorizedRelationshipValidator,
};
pub use business_action::{
    CheckProgramTreeValidatorList, CopyProgramTreeValidatorList, CopyProgramTreeVersionValidatorList,
    DeleteProgramTreeValidatorList, DeleteStandardVersionValidatorList, DetachNodeValidatorList,
    PasteNodeValidatorList, PostponeTransitionVersionValidatorList,
    UpdateLinkValidatorList, UpdatePrerequisiteValidatorList,
    UpdateProgramTreeVersionValidatorList, Validate2MTreeValidatorList,
};
pub use finality::{
    AttachFinalityEndDateValidator, AttachOptionsValidator, CheckEndDateBetweenFinalitiesAndMasters2M,
    DetachOptionValidator, Master2MEndDateValidator, ValidateFinalitiesEndDateAndOptions,
};
pub use prerequisite::{
    HasPrerequisiteValidator, IsHasPrerequisiteForAllTreesValidator, IsPrerequisiteValidator,
    PrerequisiteExpressionSyntaxValidator, PrerequisiteItemsValidator, TreePrerequisitesValidator,
};
pub use structure::{
    AuthorizedLinkTypeValidator, DetachRootForbiddenValidator, InfiniteRecursivityLinkValidator,
    InfiniteRecursivityTreeValidator, InvalidBlockValidator, MinimumEditableYearValidator,
    NodeDuplicationValidator, ParentChildSameAcademicYearValidator, ParentIsNotLeafValidator,
    PathValidator, RelativeCreditsValidator, TreeLinksValidator,
};
pub use version::{
    CheckProgramTreeEndDateValidator, CheckTreeVersionEndDateValidator,
    CheckVersionsEndDateValidator, EmptyProgramTreeValidator, MatchVersionValidator,
    NodeHaveLinkValidator, TransitionExtensionValidator,
};

/// One business rule.
///
/// Returns `DomainError::Business` when the rule is broken; any other error is
/// a failure to evaluate the rule.
pub trait BusinessValidator {
    fn validate(&self) -> DomainResult<()>;
}

/// Runs every validator and reports all broken rules at once.
///
/// Business errors are collected in declaration order; the first non-business
/// error stops the run.
pub struct BusinessListValidator<'a> {
    validators: Vec<Box<dyn BusinessValidator + 'a>>,
}

impl<'a> BusinessListValidator<'a> {
    pub fn new(validators: Vec<Box<dyn BusinessValidator + 'a>>) -> Self {
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl BusinessValidator for BusinessListValidator<'_> {
    fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        for validator in &self.validators {
            match validator.validate() {
                Ok(()) => {}
                Err(DomainError::Business(broken)) => errors.extend(broken),
                Err(other) => return Err(other),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            debug!(errors = errors.len(), "validation failed");
            Err(BusinessErrors::new(errors).into())
        }
    }
}

pub(crate) fn fail(error: BusinessError) -> DomainResult<()> {
    Err(error.into())
}

pub(crate) fn fail_all(errors: Vec<BusinessError>) -> DomainResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BusinessErrors::new(errors).into())
    }
}

/// Moves the business errors of `result` into `errors`; other errors are returned.
pub(crate) fn collect_into(result: DomainResult<()>, errors: &mut Vec<BusinessError>) -> DomainResult<()> {
    match result {
        Err(DomainError::Business(broken)) => {
            errors.extend(broken);
            Ok(())
        }
        other => other,
    }
}
