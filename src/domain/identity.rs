//! Identity value objects.

use std::fmt;

/// `(code, year)` of a node; codes are unique within a year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdentity {
    pub code: String,
    pub year: u32,
}

impl NodeIdentity {
    pub fn new(code: impl Into<String>, year: u32) -> Self {
        Self {
            code: code.into(),
            year,
        }
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.year)
    }
}

/// Identity of a tree: the identity of its root node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramTreeIdentity {
    pub code: String,
    pub year: u32,
}

impl ProgramTreeIdentity {
    pub fn new(code: impl Into<String>, year: u32) -> Self {
        Self {
            code: code.into(),
            year,
        }
    }

    pub fn next_year(&self) -> Self {
        Self::new(self.code.clone(), self.year + 1)
    }
}

impl fmt::Display for ProgramTreeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.year)
    }
}

impl From<NodeIdentity> for ProgramTreeIdentity {
    fn from(value: NodeIdentity) -> Self {
        Self {
            code: value.code,
            year: value.year,
        }
    }
}

impl From<&NodeIdentity> for ProgramTreeIdentity {
    fn from(value: &NodeIdentity) -> Self {
        Self::new(value.code.clone(), value.year)
    }
}

impl From<ProgramTreeIdentity> for NodeIdentity {
    fn from(value: ProgramTreeIdentity) -> Self {
        Self {
            code: value.code,
            year: value.year,
        }
    }
}

impl From<&ProgramTreeIdentity> for NodeIdentity {
    fn from(value: &ProgramTreeIdentity) -> Self {
        Self::new(value.code.clone(), value.year)
    }
}

/// Version name of the standard version.
pub const STANDARD: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramTreeVersionIdentity {
    pub offer_acronym: String,
    pub year: u32,
    pub version_name: String,
    pub is_transition: bool,
}

impl ProgramTreeVersionIdentity {
    pub fn new(
        offer_acronym: impl Into<String>,
        year: u32,
        version_name: impl Into<String>,
        is_transition: bool,
    ) -> Self {
        Self {
            offer_acronym: offer_acronym.into(),
            year,
            version_name: version_name.into(),
            is_transition,
        }
    }

    pub fn standard(offer_acronym: impl Into<String>, year: u32) -> Self {
        Self::new(offer_acronym, year, STANDARD, false)
    }

    pub fn is_standard(&self) -> bool {
        self.version_name == STANDARD && !self.is_transition
    }

    pub fn at_year(&self, year: u32) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    /// `(version_name, is_transition)`, shared by every offer of one version family.
    pub fn version_label(&self) -> String {
        match (self.version_name.as_str(), self.is_transition) {
            (STANDARD, false) => "standard".to_string(),
            (STANDARD, true) => "transition".to_string(),
            (name, false) => name.to_string(),
            (name, true) => format!("{name} transition"),
        }
    }
}

impl fmt::Display for ProgramTreeVersionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] ({})",
            self.offer_acronym,
            self.version_label(),
            self.year
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkIdentity {
    pub parent_code: String,
    pub child_code: String,
    pub parent_year: u32,
    pub child_year: u32,
}

impl LinkIdentity {
    pub fn new(parent: &NodeIdentity, child: &NodeIdentity) -> Self {
        Self {
            parent_code: parent.code.clone(),
            child_code: child.code.clone(),
            parent_year: parent.year,
            child_year: child.year,
        }
    }

    pub fn parent(&self) -> NodeIdentity {
        NodeIdentity::new(self.parent_code.clone(), self.parent_year)
    }

    pub fn child(&self) -> NodeIdentity {
        NodeIdentity::new(self.child_code.clone(), self.child_year)
    }
}

impl fmt::Display for LinkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} ({})",
            self.parent_code, self.parent_year, self.child_code, self.child_year
        )
    }
}
