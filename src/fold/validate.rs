//! Recursive structural validation
//!
//! A node is valid when it has a name and every public value it holds is valid in turn:
//! plain values always are, lists are valid when every element is, nodes recurse. The walk
//! only reads; validating the same tree twice gives the same answer.

use crate::fold::node::{Attribute, SequenceNode};

/// Check a node and everything it owns
pub fn validate(node: &SequenceNode) -> bool {
    !node.name.is_empty()
        && node.children.values().all(|children| validate_all(children))
        && node.attributes.values().all(validate_attribute)
}

/// True when every node in `nodes` validates
pub fn validate_all(nodes: &[SequenceNode]) -> bool {
    nodes.iter().all(validate)
}

fn validate_attribute(value: &Attribute) -> bool {
    match value {
        Attribute::Node(node) => validate(node),
        Attribute::List(values) => values.iter().all(validate_attribute),
        Attribute::Text(_) | Attribute::Flag(_) | Attribute::Number(_) => true,
    }
}
