use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::Node;
use crate::domain::node_type::NodeType;

const DEFAULT_NUMBER: u32 = 100;
const MAX_NUMBER: u32 = 999;

/// Codes of nodes created by the system, derived from an existing code.
///
/// A code reads `<letters><3 digits><suffix>`: the generated code keeps the
/// letters, takes the next free number and a suffix telling the node category.
pub struct GenerateNodeCode;

impl GenerateNodeCode {
    /// Code for a new child of type `child_type` under `parent`.
    pub fn generate_from_parent_node(
        parent: &Node,
        child_type: NodeType,
        is_taken: impl FnMut(&str) -> DomainResult<bool>,
    ) -> DomainResult<String> {
        let (prefix, number, _) = split_code(&parent.code);
        first_free(&prefix, number, suffix_for(child_type), &parent.code, is_taken)
    }

    /// Other free code for the same kind of node as `node`.
    pub fn generate_alternative(
        node: &Node,
        is_taken: impl FnMut(&str) -> DomainResult<bool>,
    ) -> DomainResult<String> {
        let (prefix, number, suffix) = split_code(&node.code);
        first_free(&prefix, number, &suffix, &node.code, is_taken)
    }
}

fn suffix_for(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Training(_) => "T",
        NodeType::MiniTraining(_) => "K",
        _ => "G",
    }
}

fn split_code(code: &str) -> (String, u32, String) {
    let prefix: String = code.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let rest = &code[prefix.len()..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let suffix = rest[digits.len()..].to_string();
    let number = digits.parse().unwrap_or(DEFAULT_NUMBER);
    (prefix, number, suffix)
}

fn first_free(
    prefix: &str,
    number: u32,
    suffix: &str,
    source: &str,
    mut is_taken: impl FnMut(&str) -> DomainResult<bool>,
) -> DomainResult<String> {
    for candidate in (number + 1)..=MAX_NUMBER {
        let code = format!("{prefix}{candidate:03}{suffix}");
        if !is_taken(&code)? {
            return Ok(code);
        }
    }
    Err(DomainError::CodeGenerationFailed {
        parent_code: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node_type::{GroupType, MiniTrainingType, TrainingType};
    use rstest::rstest;

    #[rstest]
    #[case("LBIR100B", vec![], GroupType::CommonCore.into(), "LBIR101G")]
    #[case("LBIR100B", vec!["LBIR101G", "LBIR102G"], GroupType::SubGroup.into(), "LBIR103G")]
    #[case("LDROI200M", vec![], MiniTrainingType::Option.into(), "LDROI201K")]
    #[case("LDROI200M", vec![], TrainingType::MasterMs120.into(), "LDROI201T")]
    #[case("ABC", vec![], GroupType::SubGroup.into(), "ABC101G")]
    fn given_parent_code_when_generating_then_next_free_code(
        #[case] parent_code: &str,
        #[case] taken: Vec<&str>,
        #[case] child_type: NodeType,
        #[case] expected: &str,
    ) {
        // Arrange
        let parent = Node::group(1, parent_code, 2020, TrainingType::Bachelor);

        // Act
        let code = GenerateNodeCode::generate_from_parent_node(&parent, child_type, |code| {
            Ok(taken.contains(&code))
        })
        .unwrap();

        // Assert
        assert_eq!(code, expected);
    }

    #[test]
    fn given_every_number_taken_when_generating_then_fails() {
        let parent = Node::group(1, "LBIR998B", 2020, TrainingType::Bachelor);
        let result = GenerateNodeCode::generate_from_parent_node(&parent, GroupType::SubGroup.into(), |_| Ok(true));
        assert!(matches!(result, Err(DomainError::CodeGenerationFailed { .. })));
    }

    #[test]
    fn given_node_when_generating_alternative_then_suffix_kept() {
        let node = Node::group(1, "LBIR101G", 2020, GroupType::CommonCore);
        let code = GenerateNodeCode::generate_alternative(&node, |code| Ok(code == "LBIR102G")).unwrap();
        assert_eq!(code, "LBIR103G");
    }
}
