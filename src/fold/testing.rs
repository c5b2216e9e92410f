//! Testing utilities for sequences and built nodes
//!
//!     Tests build small sequences from `(value, data)` pairs with [sequence_of] and check the
//!     resulting nodes with the fluent [assert_node] API:
//!
//!     ```rust,ignore
//!     use tokenfold::fold::testing::{assert_node, sequence_of};
//!
//!     let mut seq = sequence_of(&[("function", "f"), ("param", "x")]);
//!     let node = registry.create("function", &mut seq, LinkId::from_index(0)).unwrap();
//!
//!     assert_node(&node)
//!         .name("function")
//!         .payload(&["f"])
//!         .child_count("param", 1)
//!         .child("param", 0, |param| {
//!             param.name("param").payload(&["x"]);
//!         });
//!     ```

use crate::fold::node::SequenceNode;
use crate::fold::sequence::{LinkId, Sequence};
use crate::fold::token::RawToken;

/// Tokens from `(value, data)` pairs
pub fn tokens_of(pairs: &[(&str, &str)]) -> Vec<RawToken> {
    pairs
        .iter()
        .map(|(value, data)| RawToken::new(*value, *data))
        .collect()
}

/// A single chain built from `(value, data)` pairs; link `i` has index `i`
pub fn sequence_of(pairs: &[(&str, &str)]) -> Sequence {
    Sequence::from_tokens(tokens_of(pairs))
}

/// `(value, data)` of every link reachable from `from`
pub fn reachable(sequence: &Sequence, from: LinkId) -> Vec<(String, String)> {
    sequence
        .iter(from)
        .map(|id| (sequence.value(id).to_string(), sequence.data(id).to_string()))
        .collect()
}

/// Start a fluent assertion on a node
pub fn assert_node(node: &SequenceNode) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        context: format!("node '{}'", node.name),
    }
}

pub struct NodeAssertion<'a> {
    node: &'a SequenceNode,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.node.name, expected,
            "{}: Expected name '{}', found '{}'",
            self.context, expected, self.node.name
        );
        self
    }

    pub fn payload(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.node.payload, expected,
            "{}: payload mismatch",
            self.context
        );
        self
    }

    pub fn primary(self, expected: bool) -> Self {
        assert_eq!(
            self.node.primary, expected,
            "{}: Expected primary = {}",
            self.context, expected
        );
        self
    }

    pub fn child_count(self, slot: &str, expected: usize) -> Self {
        let actual = self.node.children_of(slot).len();
        assert_eq!(
            actual, expected,
            "{}: Expected {} children in '{}', found {}",
            self.context, expected, slot, actual
        );
        self
    }

    /// Assert the slot is absent altogether, not merely empty
    pub fn no_slot(self, slot: &str) -> Self {
        assert!(
            !self.node.children.contains_key(slot),
            "{}: Expected no '{}' slot, found {:?}",
            self.context,
            slot,
            self.node.children.get(slot)
        );
        self
    }

    pub fn child<F>(self, slot: &str, index: usize, check: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        let children = self.node.children_of(slot);
        assert!(
            index < children.len(),
            "{}: '{}' has {} children, no index {}",
            self.context,
            slot,
            children.len(),
            index
        );
        check(NodeAssertion {
            node: &children[index],
            context: format!("{} > {}[{}]", self.context, slot, index),
        });
        self
    }
}
