//! Parent to child edges of a program tree.

use generational_arena::Index;

use crate::domain::node_type::{LinkType, Quadrimester};

/// Attributes of a link that callers set on paste and update.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAttributes {
    pub relative_credits: Option<i32>,
    pub min_credits: Option<f64>,
    pub max_credits: Option<f64>,
    pub is_mandatory: bool,
    pub block: Option<u32>,
    pub access_condition: bool,
    pub link_type: Option<LinkType>,
    pub comment: String,
    pub comment_english: String,
    pub quadrimester_derogation: Option<Quadrimester>,
}

impl Default for LinkAttributes {
    fn default() -> Self {
        Self {
            relative_credits: None,
            min_credits: None,
            max_credits: None,
            is_mandatory: true,
            block: None,
            access_condition: false,
            link_type: None,
            comment: String::new(),
            comment_english: String::new(),
            quadrimester_derogation: None,
        }
    }
}

impl LinkAttributes {
    pub fn reference() -> Self {
        Self {
            link_type: Some(LinkType::Reference),
            ..Self::default()
        }
    }
}

/// Edge between two nodes of the same arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub parent: Index,
    pub child: Index,
    pub order: usize,
    pub attributes: LinkAttributes,
}

impl Link {
    pub fn new(parent: Index, child: Index, order: usize, attributes: LinkAttributes) -> Self {
        Self {
            parent,
            child,
            order,
            attributes,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.attributes.link_type == Some(LinkType::Reference)
    }
}

/// Years of study encoded by a block: its decimal digits, read left to right.
///
/// Returns None unless the digits are strictly ascending and within 1..=6.
pub fn block_years(block: u32) -> Option<Vec<u8>> {
    let digits: Vec<u8> = block
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();
    let in_range = digits.iter().all(|d| (1..=6).contains(d));
    let ascending = digits.windows(2).all(|pair| pair[0] < pair[1]);
    (in_range && ascending).then_some(digits)
}

pub fn is_valid_block(block: u32) -> bool {
    block_years(block).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(12, true)]
    #[case(46, true)]
    #[case(123456, true)]
    #[case(0, false)]
    #[case(7, false)]
    #[case(21, false)]
    #[case(11, false)]
    #[case(1234567, false)]
    fn given_block_when_validating_then_ascending_digits_in_range(
        #[case] block: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(is_valid_block(block), expected);
    }

    #[test]
    fn given_valid_block_when_decoding_then_returns_years() {
        assert_eq!(block_years(23), Some(vec![2, 3]));
    }
}
