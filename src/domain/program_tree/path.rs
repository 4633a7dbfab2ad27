//! Paths addressing one occurrence of a node: `"id1|id2|…|idn"`.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::domain::error::BusinessError;
use crate::domain::node::NodeId;

pub const PATH_SEPARATOR: char = '|';

/// Chain of node ids from the root to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(Vec<NodeId>);

impl TreePath {
    pub fn root(node_id: NodeId) -> Self {
        Self(vec![node_id])
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a parsed path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn last(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// Path of the parent occurrence; None for a root path.
    pub fn parent(&self) -> Option<TreePath> {
        (self.0.len() > 1).then(|| TreePath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Paths of every ancestor occurrence, nearest first.
    pub fn ancestors(&self) -> Vec<TreePath> {
        (1..self.0.len())
            .rev()
            .map(|len| TreePath(self.0[..len].to_vec()))
            .collect()
    }

    pub fn join(&self, node_id: NodeId) -> TreePath {
        let mut ids = self.0.clone();
        ids.push(node_id);
        TreePath(ids)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.0.contains(&node_id)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(&PATH_SEPARATOR.to_string()))
    }
}

impl FromStr for TreePath {
    type Err = BusinessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BusinessError::InvalidTreePath {
            path: s.to_string(),
        };
        if s.trim().is_empty() {
            return Err(invalid());
        }
        s.split(PATH_SEPARATOR)
            .map(|id| {
                if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                id.parse::<NodeId>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TreePath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("1|")]
    #[case("1||2")]
    #[case("a|2")]
    #[case("-1")]
    #[case("1 |2")]
    fn given_malformed_path_when_parsing_then_invalid_tree_path(#[case] input: &str) {
        assert!(matches!(
            input.parse::<TreePath>(),
            Err(BusinessError::InvalidTreePath { .. })
        ));
    }

    #[test]
    fn given_path_when_navigating_then_parent_and_ancestors_follow_prefixes() {
        let path: TreePath = "1|12|123".parse().unwrap();

        assert_eq!(path.to_string(), "1|12|123");
        assert_eq!(path.parent(), Some("1|12".parse().unwrap()));
        assert_eq!(
            path.ancestors(),
            vec!["1|12".parse().unwrap(), TreePath::root(1)]
        );
        assert_eq!(TreePath::root(1).parent(), None);
        assert_eq!(TreePath::root(1).join(5).to_string(), "1|5");
    }
}
