//! Node registry
//!
//! This module provides the name-keyed table that node construction dispatches through.
//! Each entry maps a token value to a [NodeConstructor]. Extraction asks the registry to
//! `create` a node for every matching link; a missing entry yields `None` and the caller
//! decides what that means (extraction drops the link).

use crate::fold::error::Result;
use crate::fold::node::{NodeKind, SequenceNode};
use crate::fold::sequence::{LinkId, Sequence};
use std::collections::HashMap;
use std::sync::Arc;

/// Something that can build a node out of a link
///
/// Implemented by [NodeKind] (the declarative path) and by any closure with the same shape,
/// for kinds that need to post-process the built node.
pub trait NodeConstructor: Send + Sync {
    /// Reject a constructor that could only misbehave mid-traversal
    fn check(&self) -> Result<()> {
        Ok(())
    }

    fn construct(
        &self,
        sequence: &mut Sequence,
        token: LinkId,
        registry: &NodeRegistry,
    ) -> Option<SequenceNode>;
}

impl NodeConstructor for NodeKind {
    fn check(&self) -> Result<()> {
        NodeKind::check(self)
    }

    fn construct(
        &self,
        sequence: &mut Sequence,
        token: LinkId,
        registry: &NodeRegistry,
    ) -> Option<SequenceNode> {
        Some(SequenceNode::construct(sequence, token, self, registry))
    }
}

impl<F> NodeConstructor for F
where
    F: Fn(&mut Sequence, LinkId, &NodeRegistry) -> Option<SequenceNode> + Send + Sync,
{
    fn construct(
        &self,
        sequence: &mut Sequence,
        token: LinkId,
        registry: &NodeRegistry,
    ) -> Option<SequenceNode> {
        self(sequence, token, registry)
    }
}

struct Entry {
    constructor: Arc<dyn NodeConstructor>,
    primary: bool,
}

/// Registry of node constructors keyed by token value
#[derive(Default)]
pub struct NodeRegistry {
    entries: HashMap<String, Entry>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        NodeRegistry {
            entries: HashMap::new(),
        }
    }

    /// Register a constructor under `name`, as a primary kind
    ///
    /// The constructor is checked first. If a constructor with the same name already exists,
    /// it will be replaced.
    pub fn register<C: NodeConstructor + 'static>(
        &mut self,
        name: impl Into<String>,
        ctor: C,
    ) -> Result<()> {
        ctor.check()?;
        self.entries.insert(
            name.into(),
            Entry {
                constructor: Arc::new(ctor),
                primary: true,
            },
        );
        Ok(())
    }

    /// Register a declared kind under each of its names
    ///
    /// The declaration is checked first, so a bad child kind fails here rather than
    /// half-way through a parse.
    pub fn register_kind(&mut self, kind: NodeKind) -> Result<()> {
        kind.check()?;
        let primary = kind.primary;
        let names = kind.names.clone();
        let constructor: Arc<dyn NodeConstructor> = Arc::new(kind);
        for name in names {
            self.entries.insert(
                name,
                Entry {
                    constructor: Arc::clone(&constructor),
                    primary,
                },
            );
        }
        Ok(())
    }

    /// Build a node for `token` with the constructor registered under `name`
    pub fn create(&self, name: &str, sequence: &mut Sequence, token: LinkId) -> Option<SequenceNode> {
        let entry = self.entries.get(name)?;
        entry.constructor.construct(sequence, token, self)
    }

    /// Check if a kind is registered
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether `name` is registered as a kind that stands on its own
    pub fn is_primary(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.primary)
    }

    /// List all registered names (sorted)
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("names", &self.names())
            .finish()
    }
}
