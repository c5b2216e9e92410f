//! Assembling top-level nodes from a classified sequence
//!
//!     The parse loop leaves a flat chain of links. Assembly follows `next` from the head of
//!     every chain and builds a node for every link that is still live, still carries a value,
//!     and whose kind is registered as primary. Secondary kinds are left in place for the
//!     primary nodes to extract as children.
//!
//!     Building a node reshapes the sequence (later links get emptied or removed), so each link
//!     is checked right before it is visited and its successor is read only after the build.

use crate::fold::node::SequenceNode;
use crate::fold::registry::NodeRegistry;
use crate::fold::sequence::{LinkId, LinkState, Sequence};
use crate::fold::validate::validate_all;
use tracing::debug;

/// The top-level nodes built from one sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub nodes: Vec<SequenceNode>,
}

impl Document {
    pub fn new(nodes: Vec<SequenceNode>) -> Self {
        Document { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when every top-level node validates
    pub fn validate(&self) -> bool {
        validate_all(&self.nodes)
    }

    /// Top-level nodes with the given name, in document order
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SequenceNode> {
        self.nodes.iter().filter(move |node| node.name == name)
    }
}

/// Build every primary node of `sequence`, chain by chain in document order
pub fn assemble(sequence: &mut Sequence, registry: &NodeRegistry) -> Document {
    let mut nodes = Vec::new();
    let heads: Vec<LinkId> = sequence
        .ids()
        .filter(|&id| sequence.is_reachable(id) && sequence.previous(id).is_none())
        .collect();
    for head in heads {
        let mut current = Some(head);
        while let Some(id) = current {
            let anchor = sequence.previous(id);
            if let Some(node) = build(sequence, registry, id) {
                nodes.push(node);
            }
            // Building may reshape the chain; resume from whatever follows `id` now.
            current = if sequence.is_reachable(id) {
                sequence.next(id)
            } else {
                anchor
                    .filter(|&anchor| sequence.is_reachable(anchor))
                    .and_then(|anchor| sequence.next(anchor))
            };
        }
    }
    Document::new(nodes)
}

fn build(sequence: &mut Sequence, registry: &NodeRegistry, id: LinkId) -> Option<SequenceNode> {
    if sequence.state(id) != LinkState::Live {
        return None;
    }
    let kind = sequence.value(id);
    if kind.is_empty() {
        return None;
    }
    if !registry.has(kind) {
        debug!(kind, "skipping link with unregistered kind");
        return None;
    }
    if !registry.is_primary(kind) {
        return None;
    }
    let kind = kind.to_string();
    registry.create(&kind, sequence, id)
}
