//! Inputs of the tree edition operations.

use crate::domain::link::LinkAttributes;
use crate::domain::node_type::{LinkType, Quadrimester};

/// Where and how a node is pasted.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteCommand {
    pub path_where_to_paste: String,
    pub link_type: Option<LinkType>,
    pub access_condition: bool,
    pub is_mandatory: bool,
    pub block: Option<u32>,
    pub comment: String,
    pub comment_english: String,
    pub relative_credits: Option<i32>,
    /// Set when the paste ends a cut: the node is detached from there afterwards.
    pub path_where_to_detach: Option<String>,
}

impl PasteCommand {
    pub fn new(path_where_to_paste: impl Into<String>) -> Self {
        Self {
            path_where_to_paste: path_where_to_paste.into(),
            ..Self::default()
        }
    }

    /// Attributes of the created link; `link_type` wins over the requested one.
    pub fn link_attributes(&self, link_type: Option<LinkType>) -> LinkAttributes {
        LinkAttributes {
            relative_credits: self.relative_credits,
            is_mandatory: self.is_mandatory,
            block: self.block,
            access_condition: self.access_condition,
            link_type,
            comment: self.comment.clone(),
            comment_english: self.comment_english.clone(),
            ..LinkAttributes::default()
        }
    }
}

impl Default for PasteCommand {
    fn default() -> Self {
        Self {
            path_where_to_paste: String::new(),
            link_type: None,
            access_condition: false,
            is_mandatory: true,
            block: None,
            comment: String::new(),
            comment_english: String::new(),
            relative_credits: None,
            path_where_to_detach: None,
        }
    }
}

/// New values of the editable attributes of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkUpdate {
    pub relative_credits: Option<i32>,
    pub access_condition: bool,
    pub is_mandatory: bool,
    pub block: Option<u32>,
    pub link_type: Option<LinkType>,
    pub comment: String,
    pub comment_english: String,
    pub quadrimester_derogation: Option<Quadrimester>,
}

impl LinkUpdate {
    pub fn apply_to(&self, attributes: &mut LinkAttributes) {
        attributes.relative_credits = self.relative_credits;
        attributes.access_condition = self.access_condition;
        attributes.is_mandatory = self.is_mandatory;
        attributes.block = self.block;
        attributes.link_type = self.link_type;
        attributes.comment = self.comment.clone();
        attributes.comment_english = self.comment_english.clone();
        attributes.quadrimester_derogation = self.quadrimester_derogation;
    }
}

impl From<&LinkAttributes> for LinkUpdate {
    fn from(attributes: &LinkAttributes) -> Self {
        Self {
            relative_credits: attributes.relative_credits,
            access_condition: attributes.access_condition,
            is_mandatory: attributes.is_mandatory,
            block: attributes.block,
            link_type: attributes.link_type,
            comment: attributes.comment.clone(),
            comment_english: attributes.comment_english.clone(),
            quadrimester_derogation: attributes.quadrimester_derogation,
        }
    }
}
