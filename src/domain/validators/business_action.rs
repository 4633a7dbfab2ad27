//! The validator list run before each business action.

use crate::domain::command::PasteCommand;
use crate::domain::error::DomainResult;
use crate::domain::node_type::LinkType;
use crate::domain::program_tree::{EditionContext, NodeIndex, ProgramTree};
use crate::domain::program_tree_version::ProgramTreeVersion;
use crate::domain::repository::{ProgramTreeRepository, ProgramTreeVersionRepository};

use super::{
    AttachOptionsValidator, AuthorizedLinkTypeValidator, AuthorizedRelationshipLearningUnitValidator,
    BusinessListValidator, BusinessValidator, CheckEndDateBetweenFinalitiesAndMasters2M,
    CheckProgramTreeEndDateValidator, CheckTreeVersionEndDateValidator, CheckVersionsEndDateValidator,
    DetachAuthorizedRelationshipValidator, DetachOptionValidator, EmptyProgramTreeValidator,
    InfiniteRecursivityLinkValidator, InfiniteRecursivityTreeValidator, InvalidBlockValidator,
    IsHasPrerequisiteForAllTreesValidator, Master2MEndDateValidator, MatchVersionValidator,
    MinimumEditableYearValidator, NodeDuplicationValidator, NodeHaveLinkValidator,
    ParentChildSameAcademicYearValidator, ParentIsNotLeafValidator, PasteAuthorizedRelationshipValidator,
    PrerequisiteExpressionSyntaxValidator, PrerequisiteItemsValidator, RelativeCreditsValidator,
    TransitionExtensionValidator, TreeLinksValidator, TreePrerequisitesValidator,
    UpdateLinkAuthorizedRelationshipValidator,
    ValidateFinalitiesEndDateAndOptions,
};

macro_rules! validator_list {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'a>(BusinessListValidator<'a>);

        impl BusinessValidator for $name<'_> {
            fn validate(&self) -> DomainResult<()> {
                self.0.validate()
            }
        }
    };
}

validator_list!(
    /// Everything checked before attaching `tree_to_paste` under `parent`.
    PasteNodeValidatorList
);

impl<'a> PasteNodeValidatorList<'a> {
    pub fn new(
        tree: &'a ProgramTree,
        parent: NodeIndex,
        tree_to_paste: &'a ProgramTree,
        command: &PasteCommand,
        link_type: Option<LinkType>,
        context: &EditionContext<'a>,
    ) -> Self {
        let parent_node = tree.node(parent);
        let child = tree_to_paste.root_node();
        let mut validators: Vec<Box<dyn BusinessValidator + 'a>> = vec![
            Box::new(ParentIsNotLeafValidator::new(parent_node)),
            Box::new(InfiniteRecursivityLinkValidator::new(parent_node, child)),
            Box::new(InfiniteRecursivityTreeValidator::new(tree, parent, tree_to_paste)),
            Box::new(NodeDuplicationValidator::new(tree, parent, child)),
            Box::new(MinimumEditableYearValidator::new(tree, context.year_limit_edg_modification)),
            Box::new(AuthorizedLinkTypeValidator::new(parent_node, child, link_type)),
            Box::new(InvalidBlockValidator::new(command.block)),
            Box::new(RelativeCreditsValidator::new(command.relative_credits)),
        ];
        if child.is_learning_unit() {
            validators.push(Box::new(AuthorizedRelationshipLearningUnitValidator::new(
                tree, parent, child,
            )));
        } else {
            validators.push(Box::new(ParentChildSameAcademicYearValidator::new(parent_node, child)));
            validators.push(Box::new(PasteAuthorizedRelationshipValidator::new(
                tree,
                parent,
                tree_to_paste,
                link_type,
            )));
            validators.push(Box::new(ValidateFinalitiesEndDateAndOptions::new(
                tree,
                parent,
                tree_to_paste,
                link_type,
                context.tree_repository,
            )));
            validators.push(Box::new(MatchVersionValidator::new(
                tree,
                parent,
                tree_to_paste,
                context.tree_repository,
                context.version_repository,
            )));
        }
        Self(BusinessListValidator::new(validators))
    }
}

validator_list!(
    /// Checks run before removing the link `parent -> child`; the root check runs first.
    DetachNodeValidatorList
);

impl<'a> DetachNodeValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree, parent: NodeIndex, child: NodeIndex, context: &EditionContext<'a>) -> Self {
        Self(BusinessListValidator::new(vec![
            Box::new(MinimumEditableYearValidator::new(tree, context.year_limit_edg_modification)),
            Box::new(DetachAuthorizedRelationshipValidator::new(tree, parent, child)),
            Box::new(IsHasPrerequisiteForAllTreesValidator::new(
                tree,
                parent,
                child,
                context.tree_repository,
            )),
            Box::new(DetachOptionValidator::new(tree, parent, child, context.tree_repository)),
        ]))
    }
}

validator_list!(
    /// Runs on a copy of the tree holding the updated link.
    UpdateLinkValidatorList
);

impl<'a> UpdateLinkValidatorList<'a> {
    pub fn new(updated_tree: &'a ProgramTree, parent: NodeIndex, child: NodeIndex) -> Self {
        let parent_node = updated_tree.node(parent);
        let child_node = updated_tree.node(child);
        let attributes = updated_tree
            .get_link(parent, child)
            .map(|link| link.attributes.clone())
            .unwrap_or_default();
        Self(BusinessListValidator::new(vec![
            Box::new(AuthorizedLinkTypeValidator::new(parent_node, child_node, attributes.link_type)),
            Box::new(UpdateLinkAuthorizedRelationshipValidator::new(updated_tree, parent, child)),
            Box::new(InvalidBlockValidator::new(attributes.block)),
            Box::new(RelativeCreditsValidator::new(attributes.relative_credits)),
        ]))
    }
}

validator_list!(UpdatePrerequisiteValidatorList);

impl<'a> UpdatePrerequisiteValidatorList<'a> {
    pub fn new(expression: &'a str, tree: &'a ProgramTree, node: NodeIndex) -> Self {
        Self(BusinessListValidator::new(vec![
            Box::new(PrerequisiteExpressionSyntaxValidator::new(expression)),
            Box::new(PrerequisiteItemsValidator::new(expression, tree, node)),
        ]))
    }
}

validator_list!(CopyProgramTreeValidatorList);

impl<'a> CopyProgramTreeValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self(BusinessListValidator::new(vec![Box::new(
            CheckProgramTreeEndDateValidator::new(tree),
        )]))
    }
}

validator_list!(CopyProgramTreeVersionValidatorList);

impl<'a> CopyProgramTreeVersionValidatorList<'a> {
    pub fn new(version: &'a ProgramTreeVersion) -> Self {
        Self(BusinessListValidator::new(vec![Box::new(
            CheckTreeVersionEndDateValidator::new(version),
        )]))
    }
}

validator_list!(PostponeTransitionVersionValidatorList);

impl<'a> PostponeTransitionVersionValidatorList<'a> {
    pub fn new(
        version: &'a ProgramTreeVersion,
        year: u32,
        version_repository: &'a dyn ProgramTreeVersionRepository,
    ) -> Self {
        Self(BusinessListValidator::new(vec![Box::new(
            TransitionExtensionValidator::new(version, year, version_repository),
        )]))
    }
}

validator_list!(DeleteProgramTreeValidatorList);

impl<'a> DeleteProgramTreeValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree, tree_repository: &'a dyn ProgramTreeRepository) -> Self {
        Self(BusinessListValidator::new(vec![
            Box::new(EmptyProgramTreeValidator::new(tree)),
            Box::new(NodeHaveLinkValidator::new(tree, tree_repository)),
        ]))
    }
}

validator_list!(DeleteStandardVersionValidatorList);

impl<'a> DeleteStandardVersionValidatorList<'a> {
    pub fn new(
        version: &'a ProgramTreeVersion,
        version_repository: &'a dyn ProgramTreeVersionRepository,
    ) -> Self {
        Self(BusinessListValidator::new(vec![Box::new(
            CheckVersionsEndDateValidator::new(version, version_repository),
        )]))
    }
}

validator_list!(
    /// Runs on the tree carrying the new end year of its root.
    UpdateProgramTreeVersionValidatorList
);

impl<'a> UpdateProgramTreeVersionValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree, tree_repository: &'a dyn ProgramTreeRepository) -> Self {
        Self(BusinessListValidator::new(vec![Box::new(
            CheckEndDateBetweenFinalitiesAndMasters2M::new(tree, tree_repository),
        )]))
    }
}

validator_list!(
    /// Whole-tree 2M invariants.
    Validate2MTreeValidatorList
);

impl<'a> Validate2MTreeValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self(BusinessListValidator::new(vec![
            Box::new(Master2MEndDateValidator::new(tree)),
            Box::new(AttachOptionsValidator::new(tree)),
        ]))
    }
}

validator_list!(
    /// Every invariant a stored tree must hold.
    CheckProgramTreeValidatorList
);

impl<'a> CheckProgramTreeValidatorList<'a> {
    pub fn new(tree: &'a ProgramTree) -> Self {
        Self(BusinessListValidator::new(vec![
            Box::new(TreeLinksValidator::new(tree)),
            Box::new(TreePrerequisitesValidator::new(tree)),
            Box::new(Validate2MTreeValidatorList::new(tree)),
        ]))
    }
}
