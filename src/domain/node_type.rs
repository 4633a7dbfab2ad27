//! Node type enumerations and their classification sets.
//!
//! Every enumeration renders and parses as its SCREAMING_SNAKE_CASE name,
//! the stable external spelling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Unknown label for one of the closed enumerations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Full programs.
    TrainingType {
        Aggregation => "AGGREGATION",
        CertificateOfParticipation => "CERTIFICATE_OF_PARTICIPATION",
        CertificateOfSuccess => "CERTIFICATE_OF_SUCCESS",
        CertificateOfHoldingCredits => "CERTIFICATE_OF_HOLDING_CREDITS",
        Bachelor => "BACHELOR",
        Certificate => "CERTIFICATE",
        Capaes => "CAPAES",
        ResearchCertificate => "RESEARCH_CERTIFICATE",
        UniversityFirstCycleCertificate => "UNIVERSITY_FIRST_CYCLE_CERTIFICATE",
        UniversitySecondCycleCertificate => "UNIVERSITY_SECOND_CYCLE_CERTIFICATE",
        AccessContest => "ACCESS_CONTEST",
        LanguageClass => "LANGUAGE_CLASS",
        IsolatedClass => "ISOLATED_CLASS",
        Phd => "PHD",
        FormationPhd => "FORMATION_PHD",
        JuniorYear => "JUNIOR_YEAR",
        PgrmMaster120 => "PGRM_MASTER_120",
        MasterMa120 => "MASTER_MA_120",
        MasterMd120 => "MASTER_MD_120",
        MasterMs120 => "MASTER_MS_120",
        PgrmMaster180240 => "PGRM_MASTER_180_240",
        MasterMa180240 => "MASTER_MA_180_240",
        MasterMd180240 => "MASTER_MD_180_240",
        MasterMs180240 => "MASTER_MS_180_240",
        MasterM1 => "MASTER_M1",
        MasterMc => "MASTER_MC",
        Internship => "INTERNSHIP",
    }
);

labelled_enum!(
    /// Options, minors, deepenings.
    MiniTrainingType {
        Deepening => "DEEPENING",
        SocietyMinor => "SOCIETY_MINOR",
        AccessMinor => "ACCESS_MINOR",
        OpenMinor => "OPEN_MINOR",
        DisciplinaryComplementMinor => "DISCIPLINARY_COMPLEMENT_MINOR",
        FsaSpeciality => "FSA_SPECIALITY",
        Option => "OPTION",
        MobilityPartnership => "MOBILITY_PARTNERSHIP",
    }
);

labelled_enum!(
    /// Structural containers.
    GroupType {
        CommonCore => "COMMON_CORE",
        MinorListChoice => "MINOR_LIST_CHOICE",
        MajorListChoice => "MAJOR_LIST_CHOICE",
        OptionListChoice => "OPTION_LIST_CHOICE",
        Finality120ListChoice => "FINALITY_120_LIST_CHOICE",
        Finality180ListChoice => "FINALITY_180_LIST_CHOICE",
        MobilityPartnershipListChoice => "MOBILITY_PARTNERSHIP_LIST_CHOICE",
        ComplementaryModule => "COMPLEMENTARY_MODULE",
        SubGroup => "SUB_GROUP",
    }
);

labelled_enum!(
    /// Only references are named; a missing link type is a concrete link.
    LinkType {
        Reference => "REFERENCE",
    }
);

labelled_enum!(
    ProposalType {
        Creation => "CREATION",
        Modification => "MODIFICATION",
        Transformation => "TRANSFORMATION",
        TransformationAndModification => "TRANSFORMATION_AND_MODIFICATION",
        Suppression => "SUPPRESSION",
    }
);

labelled_enum!(
    ConstraintType {
        Credits => "CREDITS",
        Number => "NUMBER",
    }
);

labelled_enum!(
    ActiveStatus {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
);

labelled_enum!(
    ScheduleType {
        Daily => "DAILY",
        Shifted => "SHIFTED",
    }
);

labelled_enum!(
    Periodicity {
        Annual => "ANNUAL",
        BiennialEven => "BIENNIAL_EVEN",
        BiennialOdd => "BIENNIAL_ODD",
    }
);

labelled_enum!(
    Quadrimester {
        Q1 => "Q1",
        Q2 => "Q2",
        Q1And2 => "Q1and2",
        Q1Or2 => "Q1or2",
        Q3 => "Q3",
    }
);

impl TrainingType {
    pub fn finality_types() -> &'static [TrainingType] {
        &[
            TrainingType::MasterMa120,
            TrainingType::MasterMd120,
            TrainingType::MasterMs120,
            TrainingType::MasterMa180240,
            TrainingType::MasterMd180240,
            TrainingType::MasterMs180240,
        ]
    }

    pub fn root_master_2m_types() -> &'static [TrainingType] {
        &[TrainingType::PgrmMaster120, TrainingType::PgrmMaster180240]
    }

    pub fn is_finality(&self) -> bool {
        Self::finality_types().contains(self)
    }

    pub fn is_root_master_2m(&self) -> bool {
        Self::root_master_2m_types().contains(self)
    }
}

impl MiniTrainingType {
    /// Mini-trainings always attached by reference under a minor/major list choice.
    pub fn minors_and_deepening() -> &'static [MiniTrainingType] {
        &[
            MiniTrainingType::Deepening,
            MiniTrainingType::SocietyMinor,
            MiniTrainingType::AccessMinor,
            MiniTrainingType::OpenMinor,
            MiniTrainingType::DisciplinaryComplementMinor,
            MiniTrainingType::FsaSpeciality,
        ]
    }
}

impl GroupType {
    /// Display order of generated mandatory children.
    pub fn ordered() -> &'static [GroupType] {
        &[
            GroupType::CommonCore,
            GroupType::Finality120ListChoice,
            GroupType::Finality180ListChoice,
            GroupType::OptionListChoice,
            GroupType::MinorListChoice,
            GroupType::MajorListChoice,
            GroupType::MobilityPartnershipListChoice,
            GroupType::ComplementaryModule,
            GroupType::SubGroup,
        ]
    }

    pub fn minor_major_list_choice() -> &'static [GroupType] {
        &[GroupType::MinorListChoice, GroupType::MajorListChoice]
    }

    pub fn minor_major_option_list_choice() -> &'static [GroupType] {
        &[
            GroupType::MinorListChoice,
            GroupType::MajorListChoice,
            GroupType::OptionListChoice,
        ]
    }

    pub fn finality_list_choice() -> &'static [GroupType] {
        &[
            GroupType::Finality120ListChoice,
            GroupType::Finality180ListChoice,
        ]
    }
}

/// Type of any node of a program tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Training(TrainingType),
    MiniTraining(MiniTrainingType),
    Group(GroupType),
    LearningUnit,
    LearningClass,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Training(t) => t.name(),
            NodeType::MiniTraining(t) => t.name(),
            NodeType::Group(t) => t.name(),
            NodeType::LearningUnit => "LEARNING_UNIT",
            NodeType::LearningClass => "LEARNING_CLASS",
        }
    }

    pub fn is_training(&self) -> bool {
        matches!(self, NodeType::Training(_))
    }

    pub fn is_mini_training(&self) -> bool {
        matches!(self, NodeType::MiniTraining(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NodeType::Group(_))
    }

    pub fn is_learning_unit(&self) -> bool {
        matches!(self, NodeType::LearningUnit)
    }

    pub fn is_group_or_mini_or_training(&self) -> bool {
        self.is_training() || self.is_mini_training() || self.is_group()
    }

    pub fn is_finality(&self) -> bool {
        matches!(self, NodeType::Training(t) if t.is_finality())
    }

    pub fn is_root_master_2m(&self) -> bool {
        matches!(self, NodeType::Training(t) if t.is_root_master_2m())
    }

    pub fn is_option(&self) -> bool {
        matches!(self, NodeType::MiniTraining(MiniTrainingType::Option))
    }

    pub fn is_minor_or_deepening(&self) -> bool {
        matches!(self, NodeType::MiniTraining(t) if MiniTrainingType::minors_and_deepening().contains(t))
    }

    pub fn is_option_list_choice(&self) -> bool {
        matches!(self, NodeType::Group(GroupType::OptionListChoice))
    }

    pub fn is_finality_list_choice(&self) -> bool {
        matches!(self, NodeType::Group(t) if GroupType::finality_list_choice().contains(t))
    }

    pub fn is_minor_major_list_choice(&self) -> bool {
        matches!(self, NodeType::Group(t) if GroupType::minor_major_list_choice().contains(t))
    }

    pub fn is_minor_major_option_list_choice(&self) -> bool {
        matches!(self, NodeType::Group(t) if GroupType::minor_major_option_list_choice().contains(t))
    }

    /// Sort key of mandatory children: ordered group types first, everything else after.
    pub fn mandatory_rank(&self) -> usize {
        let ordered = GroupType::ordered();
        match self {
            NodeType::Group(t) => ordered
                .iter()
                .position(|candidate| candidate == t)
                .unwrap_or(ordered.len()),
            _ => ordered.len(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEARNING_UNIT" => return Ok(NodeType::LearningUnit),
            "LEARNING_CLASS" => return Ok(NodeType::LearningClass),
            _ => {}
        }
        if let Ok(t) = s.parse::<TrainingType>() {
            return Ok(NodeType::Training(t));
        }
        if let Ok(t) = s.parse::<MiniTrainingType>() {
            return Ok(NodeType::MiniTraining(t));
        }
        if let Ok(t) = s.parse::<GroupType>() {
            return Ok(NodeType::Group(t));
        }
        Err(ParseEnumError {
            kind: "NodeType",
            value: s.to_string(),
        })
    }
}

impl From<TrainingType> for NodeType {
    fn from(value: TrainingType) -> Self {
        NodeType::Training(value)
    }
}

impl From<MiniTrainingType> for NodeType {
    fn from(value: MiniTrainingType) -> Self {
        NodeType::MiniTraining(value)
    }
}

impl From<GroupType> for NodeType {
    fn from(value: GroupType) -> Self {
        NodeType::Group(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_every_label_when_parsing_then_round_trips() {
        for t in TrainingType::ALL {
            assert_eq!(t.name().parse::<NodeType>(), Ok(NodeType::Training(*t)));
        }
        for t in MiniTrainingType::ALL {
            assert_eq!(t.name().parse::<NodeType>(), Ok(NodeType::MiniTraining(*t)));
        }
        for t in GroupType::ALL {
            assert_eq!(t.name().parse::<NodeType>(), Ok(NodeType::Group(*t)));
        }
        assert_eq!("LEARNING_UNIT".parse::<NodeType>(), Ok(NodeType::LearningUnit));
    }

    #[test]
    fn given_unknown_label_when_parsing_then_error_names_kind() {
        let err = "BACHELORS".parse::<NodeType>().unwrap_err();
        assert_eq!(err.kind, "NodeType");
    }

    #[test]
    fn given_group_types_when_ranking_then_follows_fixed_order() {
        let common_core = NodeType::from(GroupType::CommonCore).mandatory_rank();
        let sub_group = NodeType::from(GroupType::SubGroup).mandatory_rank();
        let option = NodeType::from(MiniTrainingType::Option).mandatory_rank();
        assert!(common_core < sub_group);
        assert!(sub_group < option);
    }

    #[test]
    fn given_classification_sets_then_membership_matches() {
        assert!(NodeType::from(TrainingType::MasterMs120).is_finality());
        assert!(!NodeType::from(TrainingType::PgrmMaster120).is_finality());
        assert!(NodeType::from(TrainingType::PgrmMaster180240).is_root_master_2m());
        assert!(NodeType::from(MiniTrainingType::FsaSpeciality).is_minor_or_deepening());
        assert!(!NodeType::from(MiniTrainingType::Option).is_minor_or_deepening());
        assert!(NodeType::from(GroupType::OptionListChoice).is_minor_major_option_list_choice());
        assert!(!NodeType::from(GroupType::OptionListChoice).is_minor_major_list_choice());
    }
}
