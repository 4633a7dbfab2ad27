//! Inputs of the application services.
//!
//! Nodes and trees are named by code and year; paths use node ids.

use crate::domain::{LinkUpdate, PasteCommand, ProgramTreeVersionIdentity};

/// Pastes the node `node_to_paste_code`/`node_to_paste_year` with its content.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteElementCommand {
    pub node_to_paste_code: String,
    pub node_to_paste_year: u32,
    pub paste: PasteCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachNodeCommand {
    pub path_where_to_detach: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLinkCommand {
    pub parent_node_path: String,
    pub child_node_code: String,
    pub child_node_year: u32,
    pub update: LinkUpdate,
}

/// Moves the link ending at `path` among its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLinkCommand {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPrerequisiteCommand {
    pub prerequisite_string: String,
    pub node_code: String,
    pub node_year: u32,
    pub program_tree_root_code: String,
    pub program_tree_root_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateProgramTreeCommand {
    pub from_root_code: String,
    pub from_root_year: u32,
    pub version_name: String,
    pub override_end_year_to: Option<u32>,
    pub override_start_year_to: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostponeProgramTreeCommand {
    pub from_code: String,
    pub from_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostponeProgramTreeVersionCommand {
    pub from: ProgramTreeVersionIdentity,
}

/// The root group `code`/`year` must already be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStandardVersionCommand {
    pub offer_acronym: String,
    pub code: String,
    pub year: u32,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub end_year_of_existence: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpecificVersionCommand {
    pub offer_acronym: String,
    pub year: u32,
    pub version_name: String,
    pub is_transition: bool,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub end_year_of_existence: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProgramTreeVersionCommand {
    pub identity: ProgramTreeVersionIdentity,
    pub title_fr: Option<String>,
    pub title_en: Option<String>,
    pub end_year_of_existence: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProgramTreeCommand {
    pub code: String,
    pub year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProgramTreeVersionCommand {
    pub identity: ProgramTreeVersionIdentity,
}
