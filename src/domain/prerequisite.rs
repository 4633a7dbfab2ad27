//! Prerequisites: boolean expressions over learning-unit acronyms.
//!
//! Grammar of an expression:
//!
//! ```text
//! expr     := ε | acronym | element (" ET " element)+ | element (" OU " element)+
//! element  := acronym | "(" acronym (" <secondary> " acronym)+ ")"
//! ```
//!
//! The main operator is OU when an unparenthesized `OU` is present, ET otherwise;
//! the secondary operator is the other one and only appears inside parentheses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::error::BusinessError;
use crate::domain::identity::{NodeIdentity, ProgramTreeIdentity};
use crate::domain::node_type::ParseEnumError;

const ACRONYM: &str = r"[BLMWX][A-Z]{2,4}\d{4}[A-Z0-9]?";

fn element(secondary: &str) -> String {
    format!(r"({ACRONYM}|\({ACRONYM}( {secondary} {ACRONYM})+\))")
}

fn multiple(main: &str, secondary: &str) -> String {
    let element = element(secondary);
    format!("{element}( {main} {element})+")
}

lazy_static! {
    static ref EXPRESSION_RE: Regex = Regex::new(&format!(
        r"(?i)^(|{ACRONYM}|{}|{})$",
        multiple("ET", "OU"),
        multiple("OU", "ET")
    ))
    .expect("prerequisite grammar is a valid regex");
    static ref ACRONYM_RE: Regex =
        Regex::new(&format!(r"(?i)\b{ACRONYM}\b")).expect("acronym pattern is a valid regex");
    static ref PARENTHESIZED_RE: Regex =
        Regex::new(r"\([^)]*\)").expect("parenthesized pattern is a valid regex");
}

/// Language of the printed operator words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            _ => Err(ParseEnumError {
                kind: "Language",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn opposite(&self) -> Operator {
        match self {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }

    pub fn word(&self, language: Language) -> &'static str {
        match (self, language) {
            (Operator::And, Language::Fr) => "ET",
            (Operator::Or, Language::Fr) => "OU",
            (Operator::And, Language::En) => "AND",
            (Operator::Or, Language::En) => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrerequisiteItem {
    pub code: String,
    pub year: u32,
}

impl PrerequisiteItem {
    pub fn new(code: impl Into<String>, year: u32) -> Self {
        Self {
            code: code.into(),
            year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteItemGroup {
    pub operator: Operator,
    pub items: Vec<PrerequisiteItem>,
}

/// Prerequisite of one learning unit within one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    pub main_operator: Operator,
    pub groups: Vec<PrerequisiteItemGroup>,
    pub node_having_prerequisites: NodeIdentity,
    pub context_tree: ProgramTreeIdentity,
}

/// Whether `expression` matches the grammar; the empty expression does.
pub fn is_valid_expression(expression: &str) -> bool {
    EXPRESSION_RE.is_match(expression.trim())
}

/// Every acronym mentioned by `expression`, uppercased, in order of appearance.
pub fn extract_codes(expression: &str) -> Vec<String> {
    ACRONYM_RE
        .find_iter(expression)
        .map(|m| m.as_str().to_uppercase())
        .unique()
        .collect()
}

/// Splits on ` <word> ` occurrences outside parentheses.
fn split_top_level<'a>(expression: &'a str, word: &str) -> Vec<&'a str> {
    let separator = format!(" {word} ");
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < expression.len() {
        let rest = &expression[i..];
        if rest.starts_with('(') {
            depth += 1;
        } else if rest.starts_with(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && rest.starts_with(&separator) {
            parts.push(&expression[start..i]);
            i += separator.len();
            start = i;
            continue;
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    parts.push(&expression[start..]);
    parts
}

impl Prerequisite {
    /// Prerequisite without any group; stored as "no prerequisite".
    pub fn empty(node_having_prerequisites: NodeIdentity, context_tree: ProgramTreeIdentity) -> Self {
        Self {
            main_operator: Operator::And,
            groups: Vec::new(),
            node_having_prerequisites,
            context_tree,
        }
    }

    /// Parses `expression`; items take the year of the node having the prerequisite.
    pub fn parse(
        expression: &str,
        node_having_prerequisites: NodeIdentity,
        context_tree: ProgramTreeIdentity,
    ) -> Result<Self, BusinessError> {
        let normalized = expression.trim().to_uppercase();
        if !is_valid_expression(&normalized) {
            return Err(BusinessError::PrerequisiteSyntaxInvalid {
                expression: expression.to_string(),
            });
        }
        let year = node_having_prerequisites.year;
        let mut prerequisite = Self::empty(node_having_prerequisites, context_tree);
        if normalized.is_empty() {
            return Ok(prerequisite);
        }

        let unparenthesized = PARENTHESIZED_RE.replace_all(&normalized, "");
        let main_operator = if unparenthesized.contains(" OU ") {
            Operator::Or
        } else {
            Operator::And
        };
        let secondary = main_operator.opposite();

        prerequisite.main_operator = main_operator;
        prerequisite.groups = split_top_level(&normalized, main_operator.word(Language::Fr))
            .into_iter()
            .map(|element| {
                let inner = element.trim_start_matches('(').trim_end_matches(')');
                PrerequisiteItemGroup {
                    operator: secondary,
                    items: split_top_level(inner, secondary.word(Language::Fr))
                        .into_iter()
                        .map(|code| PrerequisiteItem::new(code.trim(), year))
                        .collect(),
                }
            })
            .collect();
        Ok(prerequisite)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.items.is_empty())
    }

    pub fn get_all_prerequisite_items(&self) -> Vec<&PrerequisiteItem> {
        self.groups.iter().flat_map(|g| g.items.iter()).collect()
    }

    pub fn has_item(&self, code: &str) -> bool {
        self.get_all_prerequisite_items()
            .iter()
            .any(|item| item.code == code)
    }

    /// Prints with localized operators; groups get parentheses only when needed.
    pub fn to_expression(&self, language: Language) -> String {
        let parenthesize = self.groups.len() > 1;
        self.groups
            .iter()
            .map(|group| {
                let joined = group
                    .items
                    .iter()
                    .map(|item| item.code.as_str())
                    .join(&format!(" {} ", group.operator.word(language)));
                if parenthesize && group.items.len() > 1 {
                    format!("({joined})")
                } else {
                    joined
                }
            })
            .join(&format!(" {} ", self.main_operator.word(language)))
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression(Language::Fr))
    }
}

/// All prerequisites of one tree, keyed by the learning unit having them.
#[derive(Debug, Clone, PartialEq)]
pub struct Prerequisites {
    context_tree: ProgramTreeIdentity,
    by_node: BTreeMap<NodeIdentity, Prerequisite>,
}

impl Prerequisites {
    pub fn new(context_tree: ProgramTreeIdentity) -> Self {
        Self {
            context_tree,
            by_node: BTreeMap::new(),
        }
    }

    pub fn context_tree(&self) -> &ProgramTreeIdentity {
        &self.context_tree
    }

    pub fn get(&self, node: &NodeIdentity) -> Option<&Prerequisite> {
        self.by_node.get(node)
    }

    /// Replaces the prerequisite of its node; an empty one removes it.
    pub fn set(&mut self, prerequisite: Prerequisite) {
        let node = prerequisite.node_having_prerequisites.clone();
        if prerequisite.is_empty() {
            self.by_node.remove(&node);
        } else {
            self.by_node.insert(node, prerequisite);
        }
    }

    pub fn remove(&mut self, node: &NodeIdentity) -> Option<Prerequisite> {
        self.by_node.remove(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prerequisite> {
        self.by_node.values()
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Whether some learning unit of the tree requires `code`.
    pub fn is_prerequisite(&self, code: &str) -> bool {
        self.by_node.values().any(|p| p.has_item(code))
    }

    pub fn has_prerequisite(&self, node: &NodeIdentity) -> bool {
        self.by_node.contains_key(node)
    }

    pub fn nodes_having_prerequisite_on(&self, code: &str) -> Vec<&NodeIdentity> {
        self.by_node
            .iter()
            .filter(|(_, p)| p.has_item(code))
            .map(|(node, _)| node)
            .collect()
    }
}
