//! Reference data providers: the authorized relationship table and the
//! initial values of generated nodes

use std::sync::Arc;

use tracing::debug;

use crate::application::ApplicationError;
use crate::config::{FieldRuleConfig, Settings};
use crate::domain::repository::{AuthorizedRelationshipsProvider, FieldValidationRule, FieldValidationRuleProvider};
use crate::domain::{AuthorizedRelationship, AuthorizedRelationshipList, GroupType, MiniTrainingType, NodeType, TrainingType};

use super::InfraResult;

/// Relationship table used when a fixture brings none.
pub fn default_relationships() -> AuthorizedRelationshipList {
    use GroupType::*;
    use MiniTrainingType as Mini;
    use TrainingType::*;

    const MANY: u32 = 99;
    const UNITS: u32 = 999;

    let mut relationships = Vec::new();
    let mut allow = |parent: NodeType, child: NodeType, min: u32, max: u32| {
        relationships.push(AuthorizedRelationship::new(parent, child, min, max));
    };

    for training in [Bachelor, Aggregation, Capaes, Certificate, MasterM1, MasterMc] {
        allow(training.into(), CommonCore.into(), 1, 1);
        allow(training.into(), ComplementaryModule.into(), 0, 1);
    }
    allow(Bachelor.into(), MinorListChoice.into(), 0, 1);
    allow(Bachelor.into(), MajorListChoice.into(), 0, 1);
    allow(Bachelor.into(), MobilityPartnershipListChoice.into(), 0, 1);

    allow(PgrmMaster120.into(), CommonCore.into(), 1, 1);
    allow(PgrmMaster120.into(), Finality120ListChoice.into(), 1, 1);
    allow(PgrmMaster120.into(), OptionListChoice.into(), 0, 1);
    allow(PgrmMaster120.into(), MinorListChoice.into(), 0, 1);
    allow(PgrmMaster120.into(), ComplementaryModule.into(), 0, 1);
    allow(PgrmMaster180240.into(), CommonCore.into(), 1, 1);
    allow(PgrmMaster180240.into(), Finality180ListChoice.into(), 1, 1);
    allow(PgrmMaster180240.into(), OptionListChoice.into(), 0, 1);
    allow(PgrmMaster180240.into(), ComplementaryModule.into(), 0, 1);

    for finality in [MasterMa120, MasterMd120, MasterMs120] {
        allow(Finality120ListChoice.into(), finality.into(), 0, MANY);
    }
    for finality in [MasterMa180240, MasterMd180240, MasterMs180240] {
        allow(Finality180ListChoice.into(), finality.into(), 0, MANY);
    }
    for &finality in TrainingType::finality_types() {
        allow(finality.into(), CommonCore.into(), 1, 1);
        allow(finality.into(), OptionListChoice.into(), 0, 1);
    }

    allow(OptionListChoice.into(), Mini::Option.into(), 0, MANY);
    for &minor in Mini::minors_and_deepening() {
        let list = if matches!(minor, Mini::Deepening | Mini::FsaSpeciality) {
            MajorListChoice
        } else {
            MinorListChoice
        };
        allow(list.into(), minor.into(), 0, MANY);
    }
    allow(MobilityPartnershipListChoice.into(), Mini::MobilityPartnership.into(), 0, MANY);

    for container in [
        NodeType::from(CommonCore),
        ComplementaryModule.into(),
        SubGroup.into(),
        Mini::Option.into(),
        Mini::Deepening.into(),
        Mini::SocietyMinor.into(),
        Mini::AccessMinor.into(),
        Mini::OpenMinor.into(),
        Mini::DisciplinaryComplementMinor.into(),
        Mini::FsaSpeciality.into(),
        Mini::MobilityPartnership.into(),
    ] {
        allow(container, SubGroup.into(), 0, MANY);
        allow(container, NodeType::LearningUnit, 0, UNITS);
    }

    AuthorizedRelationshipList::new(relationships)
}

/// Serves one relationship table to every tree.
pub struct StaticAuthorizedRelationships {
    relationships: Arc<AuthorizedRelationshipList>,
}

impl StaticAuthorizedRelationships {
    pub fn new(relationships: AuthorizedRelationshipList) -> Self {
        Self::shared(Arc::new(relationships))
    }

    pub fn shared(relationships: Arc<AuthorizedRelationshipList>) -> Self {
        Self { relationships }
    }
}

impl Default for StaticAuthorizedRelationships {
    fn default() -> Self {
        Self::new(default_relationships())
    }
}

impl AuthorizedRelationshipsProvider for StaticAuthorizedRelationships {
    fn get(&self) -> Arc<AuthorizedRelationshipList> {
        Arc::clone(&self.relationships)
    }
}

#[derive(Debug, Clone)]
struct FieldRule {
    node_type: NodeType,
    field: String,
    is_version: bool,
    initial_value: String,
}

/// Field rules read from the settings.
///
/// A version lookup without a version rule falls back to the plain rule.
#[derive(Debug, Clone, Default)]
pub struct ConfigFieldValidationRules {
    rules: Vec<FieldRule>,
}

impl ConfigFieldValidationRules {
    pub fn from_settings(settings: &Settings) -> InfraResult<Self> {
        let rules = settings
            .field_rules
            .iter()
            .map(Self::parse_rule)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rules = rules.len(), "field rules loaded");
        Ok(Self { rules })
    }

    fn parse_rule(rule: &FieldRuleConfig) -> Result<FieldRule, ApplicationError> {
        let node_type = rule.node_type.parse().map_err(|e| ApplicationError::Config {
            message: format!("field rule {}: {}", rule.field, e),
        })?;
        Ok(FieldRule {
            node_type,
            field: rule.field.clone(),
            is_version: rule.is_version,
            initial_value: rule.initial_value.clone(),
        })
    }

    fn find(&self, node_type: NodeType, field: &str, is_version: bool) -> Option<&FieldRule> {
        self.rules
            .iter()
            .find(|rule| rule.node_type == node_type && rule.field == field && rule.is_version == is_version)
    }
}

impl FieldValidationRuleProvider for ConfigFieldValidationRules {
    fn get(&self, node_type: NodeType, field: &str, is_version: bool) -> FieldValidationRule {
        let rule = self
            .find(node_type, field, is_version)
            .or_else(|| is_version.then(|| self.find(node_type, field, false)).flatten());
        FieldValidationRule {
            initial_value: rule.map(|rule| rule.initial_value.clone()),
        }
    }
}
