//! Nodes of a program tree and the factory creating new ones.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::trace;

use crate::domain::identity::NodeIdentity;
use crate::domain::link::Link;
use crate::domain::node_type::{
    ActiveStatus, ConstraintType, NodeType, Periodicity, ProposalType, Quadrimester, ScheduleType,
};

/// Surrogate id of a node, used in tree paths.
pub type NodeId = i64;

/// Attributes only carried by trainings, mini-trainings and groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAttributes {
    pub constraint_type: Option<ConstraintType>,
    pub min_constraint: Option<u32>,
    pub max_constraint: Option<u32>,
    pub remark_fr: Option<String>,
    pub remark_en: Option<String>,
    pub group_title_fr: Option<String>,
    pub group_title_en: Option<String>,
    pub teaching_campus: Option<String>,
    pub management_entity_acronym: Option<String>,
    pub offer_status: Option<ActiveStatus>,
    pub schedule_type: Option<ScheduleType>,
    pub keywords: String,
    pub version_name: String,
    pub version_title_fr: Option<String>,
    pub version_title_en: Option<String>,
}

/// Attributes only carried by learning units.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningUnitAttributes {
    pub proposal_type: Option<ProposalType>,
    pub periodicity: Option<Periodicity>,
    pub quadrimester: Option<Quadrimester>,
    pub status: bool,
    pub volume_total_lecturing: Option<f64>,
    pub volume_total_practical: Option<f64>,
    pub specific_title_fr: Option<String>,
    pub specific_title_en: Option<String>,
    pub common_title_fr: Option<String>,
    pub common_title_en: Option<String>,
    pub other_remark: Option<String>,
}

impl Default for LearningUnitAttributes {
    fn default() -> Self {
        Self {
            proposal_type: None,
            periodicity: None,
            quadrimester: None,
            status: true,
            volume_total_lecturing: None,
            volume_total_practical: None,
            specific_title_fr: None,
            specific_title_en: None,
            common_title_fr: None,
            common_title_en: None,
            other_remark: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group(GroupAttributes),
    LearningUnit(LearningUnitAttributes),
    LearningClass,
}

/// A node of a program tree.
///
/// Equality and hashing use `node_id` only. `children` is owned by the tree
/// the node lives in: link endpoints are indices into that tree's arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub node_id: NodeId,
    pub code: String,
    pub year: u32,
    pub node_type: NodeType,
    pub title: String,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub credits: Option<f64>,
    pub start_year: u32,
    pub end_year: Option<u32>,
    pub children: Vec<Link>,
    pub kind: NodeKind,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
    }
}

impl Node {
    /// Training, mini-training or group node.
    pub fn group(
        node_id: NodeId,
        code: impl Into<String>,
        year: u32,
        node_type: impl Into<NodeType>,
    ) -> Self {
        let code = code.into();
        Self {
            node_id,
            title: code.clone(),
            code,
            year,
            node_type: node_type.into(),
            title_fr: None,
            title_en: None,
            credits: None,
            start_year: year,
            end_year: None,
            children: Vec::new(),
            kind: NodeKind::Group(GroupAttributes::default()),
        }
    }

    pub fn learning_unit(node_id: NodeId, code: impl Into<String>, year: u32) -> Self {
        let code = code.into();
        Self {
            node_id,
            title: code.clone(),
            code,
            year,
            node_type: NodeType::LearningUnit,
            title_fr: None,
            title_en: None,
            credits: None,
            start_year: year,
            end_year: None,
            children: Vec::new(),
            kind: NodeKind::LearningUnit(LearningUnitAttributes::default()),
        }
    }

    pub fn learning_class(node_id: NodeId, code: impl Into<String>, year: u32) -> Self {
        let code = code.into();
        Self {
            node_id,
            title: code.clone(),
            code,
            year,
            node_type: NodeType::LearningClass,
            title_fr: None,
            title_en: None,
            credits: None,
            start_year: year,
            end_year: None,
            children: Vec::new(),
            kind: NodeKind::LearningClass,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_end_year(mut self, end_year: Option<u32>) -> Self {
        self.end_year = end_year;
        self
    }

    pub fn with_credits(mut self, credits: f64) -> Self {
        self.credits = Some(credits);
        self
    }

    pub fn entity_id(&self) -> NodeIdentity {
        NodeIdentity::new(self.code.clone(), self.year)
    }

    pub fn is_learning_unit(&self) -> bool {
        matches!(self.kind, NodeKind::LearningUnit(_))
    }

    pub fn is_group_or_mini_or_training(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn is_training(&self) -> bool {
        self.node_type.is_training()
    }

    pub fn is_mini_training(&self) -> bool {
        self.node_type.is_mini_training()
    }

    pub fn is_finality(&self) -> bool {
        self.node_type.is_finality()
    }

    pub fn is_master_2m(&self) -> bool {
        self.node_type.is_root_master_2m()
    }

    pub fn is_option(&self) -> bool {
        self.node_type.is_option()
    }

    pub fn is_minor_or_deepening(&self) -> bool {
        self.node_type.is_minor_or_deepening()
    }

    pub fn is_minor_major_list_choice(&self) -> bool {
        self.node_type.is_minor_major_list_choice()
    }

    pub fn is_minor_major_option_list_choice(&self) -> bool {
        self.node_type.is_minor_major_option_list_choice()
    }

    pub fn has_proposal(&self) -> bool {
        matches!(&self.kind, NodeKind::LearningUnit(lu) if lu.proposal_type.is_some())
    }

    pub fn group_attributes(&self) -> Option<&GroupAttributes> {
        match &self.kind {
            NodeKind::Group(attributes) => Some(attributes),
            _ => None,
        }
    }

    pub fn group_attributes_mut(&mut self) -> Option<&mut GroupAttributes> {
        match &mut self.kind {
            NodeKind::Group(attributes) => Some(attributes),
            _ => None,
        }
    }

    pub fn learning_unit_attributes(&self) -> Option<&LearningUnitAttributes> {
        match &self.kind {
            NodeKind::LearningUnit(attributes) => Some(attributes),
            _ => None,
        }
    }

    pub fn version_name(&self) -> &str {
        self.group_attributes()
            .map(|g| g.version_name.as_str())
            .unwrap_or_default()
    }

    /// None is an open end.
    pub fn ends_after(&self, other_end_year: Option<u32>) -> bool {
        match (self.end_year, other_end_year) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(mine), Some(other)) => mine > other,
        }
    }

    /// Copy without children, for insertion into another arena.
    pub fn detached_copy(&self) -> Node {
        Node {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// Creates nodes that do not come from storage.
///
/// Holds the process-wide id sequence; share it through an `Arc`.
#[derive(Debug)]
pub struct NodeFactory {
    next_id: AtomicI64,
}

impl NodeFactory {
    pub fn new(first_id: NodeId) -> Self {
        Self {
            next_id: AtomicI64::new(first_id),
        }
    }

    pub fn next_node_id(&self) -> NodeId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Group child of `parent` inheriting its year, lifetime and management data.
    pub fn generate_from_parent(
        &self,
        parent: &Node,
        child_type: NodeType,
        code: String,
        title_prefix: &str,
    ) -> Node {
        let mut child = Node::group(self.next_node_id(), code, parent.year, child_type)
            .with_title(format!("{}{}", title_prefix, parent.title))
            .with_end_year(parent.end_year);
        child.start_year = parent.start_year;
        if let (Some(from), Some(to)) = (parent.group_attributes(), child.group_attributes_mut()) {
            to.teaching_campus = from.teaching_campus.clone();
            to.management_entity_acronym = from.management_entity_acronym.clone();
            to.version_name = from.version_name.clone();
        }
        trace!(code = %child.code, node_type = %child_type, "generated child");
        child
    }

    pub fn copy_to_next_year(&self, node: &Node) -> Node {
        Node {
            node_id: self.next_node_id(),
            year: node.year + 1,
            ..node.detached_copy()
        }
    }

    /// Same identity, fresh node id.
    pub fn duplicate(
        &self,
        node: &Node,
        override_end_year_to: Option<u32>,
        override_start_year_to: Option<u32>,
    ) -> Node {
        let mut copy = Node {
            node_id: self.next_node_id(),
            ..node.detached_copy()
        };
        if let Some(end_year) = override_end_year_to {
            copy.end_year = Some(end_year);
        }
        if let Some(start_year) = override_start_year_to {
            copy.start_year = start_year;
        }
        copy
    }
}
