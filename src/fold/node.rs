//! Sequence nodes and the construction algorithm that folds links into them
//!
//!     A [SequenceNode] is built from exactly one link of a [Sequence]. Building it is the only
//!     time the node is mutated, and it is also the only place where the sequence is reshaped:
//!
//!         1. The node claims its link, then takes its name from the link's value and its
//!            payload from the link's data, split into paragraphs on runs of blank lines.
//!         2. Absorption: if the kind declares `absorb_previous`/`absorb_next`, the contiguous
//!            neighbours of that kind (with non-empty data) are folded into the payload, in
//!            document order, and emptied in place.
//!         3. Extraction: for every declared child kind, in order, the sequence is rewound to
//!            its head and scanned forward. Each match is built through the registry, stored
//!            under the sanitized kind name, and removed from the sequence. Matches with no
//!            registered constructor are removed all the same. Only live links match, and a
//!            child kind with no slot name is skipped, so placeholders and sentinels stay put
//!            even for kinds that never went through [NodeKind::check].
//!
//!     The tree is shallow: a node owns one level of child collections, and a child is whatever
//!     its own constructor made of its link. Claimed links are invisible to every scan, so a kind
//!     that lists itself (or a kind that extracts it) as a child never revisits a link that is
//!     already being built.

use crate::fold::error::{Error, Result};
use crate::fold::registry::NodeRegistry;
use crate::fold::sequence::{Direction, LinkId, Sequence};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, trace};

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Keys a child slot may not take, since the serialized view already uses them
pub const RESERVED_SLOTS: &[&str] = &["name", "payload"];

/// Split raw token data into paragraphs on runs of two or more newlines
///
/// Empty data has no paragraphs.
pub fn split_paragraphs(data: &str) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }
    PARAGRAPH_BREAK.split(data).map(str::to_string).collect()
}

/// Slot name under which children of `kind` are stored: the kind with everything but ASCII
/// letters, digits and `_` stripped
pub fn sanitize_kind(kind: &str) -> String {
    NON_WORD.replace_all(kind, "").into_owned()
}

/// Extra value attached to a node by a custom constructor
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Text(String),
    Flag(bool),
    Number(i64),
    List(Vec<Attribute>),
    Node(Box<SequenceNode>),
}

/// Declaration of a node kind: how nodes of this kind fold their neighbourhood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKind {
    /// Token values this kind is registered under
    pub names: Vec<String>,
    /// False for kinds that only make sense attached to another node
    pub primary: bool,
    pub absorb_previous: Option<String>,
    pub absorb_next: Option<String>,
    /// Kinds extracted as children, in search order
    pub child_kinds: Vec<String>,
}

impl NodeKind {
    pub fn new(name: impl Into<String>) -> Self {
        NodeKind {
            names: vec![name.into()],
            primary: true,
            absorb_previous: None,
            absorb_next: None,
            child_kinds: Vec::new(),
        }
    }

    /// Register the kind under one more token value
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Mark the kind as needing a parent node
    pub fn secondary(mut self) -> Self {
        self.primary = false;
        self
    }

    pub fn absorb_previous(mut self, kind: impl Into<String>) -> Self {
        self.absorb_previous = Some(kind.into());
        self
    }

    pub fn absorb_next(mut self, kind: impl Into<String>) -> Self {
        self.absorb_next = Some(kind.into());
        self
    }

    pub fn child(mut self, kind: impl Into<String>) -> Self {
        self.child_kinds.push(kind.into());
        self
    }

    /// Reject declarations that could only fail later, mid-traversal
    pub fn check(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::invalid_kind("", "declares no names"));
        }
        if let Some(name) = self.names.iter().find(|name| name.is_empty()) {
            return Err(Error::invalid_kind(name.as_str(), "empty kind name"));
        }
        let label = &self.names[0];
        for absorbed in [&self.absorb_previous, &self.absorb_next].into_iter().flatten() {
            if absorbed.is_empty() {
                return Err(Error::invalid_kind(label.as_str(), "absorbs an empty kind"));
            }
        }
        for child in &self.child_kinds {
            let slot = sanitize_kind(child);
            if slot.is_empty() {
                return Err(Error::invalid_kind(
                    label.as_str(),
                    format!("child kind '{child}' sanitizes to an empty slot name"),
                ));
            }
            if RESERVED_SLOTS.contains(&slot.as_str()) {
                return Err(Error::invalid_kind(
                    label.as_str(),
                    format!("child kind '{child}' uses reserved slot '{slot}'"),
                ));
            }
        }
        Ok(())
    }
}

/// A node of the shallow tree
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceNode {
    /// Kind label taken from the originating link
    pub name: String,
    /// Paragraphs belonging to this node, in document order
    pub payload: Vec<String>,
    pub primary: bool,
    /// Extracted children keyed by sanitized kind name
    pub children: BTreeMap<String, Vec<SequenceNode>>,
    pub attributes: BTreeMap<String, Attribute>,
}

impl SequenceNode {
    pub fn new(name: impl Into<String>, payload: Vec<String>) -> Self {
        SequenceNode {
            name: name.into(),
            payload,
            primary: true,
            children: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Build a node from `token`, folding and extracting as `kind` declares
    pub fn construct(
        sequence: &mut Sequence,
        token: LinkId,
        kind: &NodeKind,
        registry: &NodeRegistry,
    ) -> SequenceNode {
        sequence.claim(token);
        let mut node = SequenceNode::new(
            sequence.value(token),
            split_paragraphs(sequence.data(token)),
        );
        node.primary = kind.primary;
        node.absorb(sequence, token, kind);
        node.extract(sequence, token, &kind.child_kinds, registry);
        node
    }

    /// Children stored under `slot`, empty when the slot is absent
    pub fn children_of(&self, slot: &str) -> &[SequenceNode] {
        self.children.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Attribute) {
        self.attributes.insert(key.into(), value);
    }

    /// Payload joined back into text
    pub fn text(&self) -> String {
        self.payload.join("\n\n")
    }

    fn absorb(&mut self, sequence: &mut Sequence, token: LinkId, kind: &NodeKind) {
        let directions = [
            (Direction::Previous, kind.absorb_previous.as_deref()),
            (Direction::Next, kind.absorb_next.as_deref()),
        ];
        for (direction, absorbed_kind) in directions {
            let Some(absorbed_kind) = absorbed_kind else {
                continue;
            };
            let siblings = sequence.siblings(token, absorbed_kind, direction);
            if siblings.is_empty() {
                continue;
            }
            trace!(
                node = %self.name,
                kind = absorbed_kind,
                count = siblings.len(),
                ?direction,
                "absorbing siblings"
            );
            let mut absorbed = Vec::new();
            for id in siblings {
                absorbed.extend(split_paragraphs(&sequence.empty(id)));
            }
            match direction {
                Direction::Previous => {
                    absorbed.append(&mut self.payload);
                    self.payload = absorbed;
                }
                Direction::Next => self.payload.append(&mut absorbed),
            }
        }
    }

    fn extract(
        &mut self,
        sequence: &mut Sequence,
        token: LinkId,
        child_kinds: &[String],
        registry: &NodeRegistry,
    ) {
        if child_kinds.is_empty() {
            return;
        }
        let mut first = Some(sequence.head(token));
        for kind in child_kinds {
            let slot = sanitize_kind(kind);
            if kind.is_empty() || slot.is_empty() {
                debug!(node = %self.name, kind = %kind, "skipping child kind with no slot name");
                continue;
            }
            let mut current = rewind(sequence, token, first);
            while let Some(found) = current.and_then(|id| sequence.find(id, kind, Direction::Next))
            {
                match registry.create(kind, sequence, found) {
                    Some(child) => self.children.entry(slot.clone()).or_default().push(child),
                    None => debug!(node = %self.name, kind = %kind, "dropping token with no constructor"),
                }
                // The child's own construction may already have spliced `found` out.
                let still_linked = sequence.is_reachable(found);
                let next = sequence.remove(found);
                if first == Some(found) {
                    first = next;
                }
                current = if still_linked {
                    next
                } else {
                    rewind(sequence, token, first)
                };
            }
        }
    }
}

/// Head of the sequence, reached from the node's own link or, once that is gone, from the
/// last known head
fn rewind(sequence: &Sequence, token: LinkId, first: Option<LinkId>) -> Option<LinkId> {
    [Some(token), first]
        .into_iter()
        .flatten()
        .find(|id| sequence.is_reachable(*id))
        .map(|id| sequence.head(id))
}
