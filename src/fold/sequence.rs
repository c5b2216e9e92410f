//! Arena-backed doubly linked sequence of token links
//!
//!     Classified tokens live in a single `Vec` and refer to their neighbours through
//!     [LinkId] indices. New links are appended to the arena but may be threaded anywhere in a
//!     chain (see [Sequence::push_after]), so arena order is not document order: walk `next`
//!     from [Sequence::head] for that.
//!
//! Two Kinds of Consumption
//!
//!     Node construction consumes links in two different ways and the difference is
//!     observable by later traversals:
//!
//!         - Emptied: the link's data and value were folded into another node's payload. It
//!           stays linked in place, but it is inert: nothing matches an empty value.
//!         - Removed: the link was extracted as a child. Its neighbours are relinked to each
//!           other and it can no longer be reached through `next`/`previous`.
//!
//!     A link a node is being (or has been) built from is Claimed: it keeps its data and its
//!     place, but searches and absorption pass it by, so no node ever extracts or absorbs the
//!     link another node was built from.
//!
//!     See [LinkState].

use crate::fold::token::RawToken;
use serde::Serialize;

/// Stable handle to a link in a [Sequence]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LinkId(usize);

impl LinkId {
    /// Handle for the arena slot at `index`
    pub fn from_index(index: usize) -> Self {
        LinkId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Lifecycle of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Live,
    /// A node was built from this link
    Claimed,
    /// Absorbed into a payload; still linked, data and value cleared
    Emptied,
    /// Spliced out of the sequence
    Removed,
}

/// Traversal direction along the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// One element of the sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub data: String,
    pub value: String,
    pub previous: Option<LinkId>,
    pub next: Option<LinkId>,
    pub state: LinkState,
}

impl Link {
    fn from_token(token: RawToken) -> Self {
        Link {
            data: token.data,
            value: token.value,
            ..Link::default()
        }
    }
}

/// Doubly linked list of token links stored in an arena
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    links: Vec<Link>,
}

impl Sequence {
    pub fn new() -> Self {
        Sequence { links: Vec::new() }
    }

    /// Build a single chain out of a token stream, in stream order
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = RawToken>,
    {
        let mut sequence = Sequence::new();
        let mut last = None;
        for token in tokens {
            last = Some(sequence.push_after(last, token));
        }
        sequence
    }

    /// Number of slots in the arena, removed links included
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Every slot in arena order
    pub fn ids(&self) -> impl Iterator<Item = LinkId> {
        (0..self.links.len()).map(LinkId)
    }

    /// Append a detached link
    pub fn push(&mut self, token: RawToken) -> LinkId {
        self.links.push(Link::from_token(token));
        LinkId(self.links.len() - 1)
    }

    /// Append a link and thread it right after `after`
    ///
    /// If `after` already has a successor, the new link is inserted between the two.
    pub fn push_after(&mut self, after: Option<LinkId>, token: RawToken) -> LinkId {
        let id = self.push(token);
        if let Some(after) = after {
            self.link_after(after, id);
        }
        id
    }

    /// Thread a detached link right after `after`
    pub fn link_after(&mut self, after: LinkId, id: LinkId) {
        let successor = self.links[after.0].next;
        self.links[after.0].next = Some(id);
        self.links[id.0].previous = Some(after);
        self.links[id.0].next = successor;
        if let Some(successor) = successor {
            self.links[successor.0].previous = Some(id);
        }
    }

    pub fn get(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn data(&self, id: LinkId) -> &str {
        &self.links[id.0].data
    }

    pub fn value(&self, id: LinkId) -> &str {
        &self.links[id.0].value
    }

    pub fn state(&self, id: LinkId) -> LinkState {
        self.links[id.0].state
    }

    pub fn next(&self, id: LinkId) -> Option<LinkId> {
        self.links[id.0].next
    }

    pub fn previous(&self, id: LinkId) -> Option<LinkId> {
        self.links[id.0].previous
    }

    pub fn step(&self, id: LinkId, direction: Direction) -> Option<LinkId> {
        match direction {
            Direction::Previous => self.previous(id),
            Direction::Next => self.next(id),
        }
    }

    /// True unless the link was removed
    pub fn is_reachable(&self, id: LinkId) -> bool {
        self.state(id) != LinkState::Removed
    }

    /// Rewind to the first link of the chain `id` belongs to
    pub fn head(&self, id: LinkId) -> LinkId {
        let mut current = id;
        while let Some(previous) = self.previous(current) {
            current = previous;
        }
        current
    }

    /// Walk to the last link of the chain `id` belongs to
    pub fn tail(&self, id: LinkId) -> LinkId {
        let mut current = id;
        while let Some(next) = self.next(current) {
            current = next;
        }
        current
    }

    /// First live link at or after `from` (in `direction`) whose value is `kind`
    ///
    /// Claimed links and emptied placeholders never match.
    pub fn find(&self, from: LinkId, kind: &str, direction: Direction) -> Option<LinkId> {
        let mut current = Some(from);
        while let Some(id) = current {
            if self.state(id) == LinkState::Live && self.value(id) == kind {
                return Some(id);
            }
            current = self.step(id, direction);
        }
        None
    }

    /// Contiguous live neighbours of `from` in `direction` with value `kind` and non-empty data
    ///
    /// `from` itself is not included. The result is in document order regardless of direction.
    pub fn siblings(&self, from: LinkId, kind: &str, direction: Direction) -> Vec<LinkId> {
        let mut found = Vec::new();
        let mut current = self.step(from, direction);
        while let Some(id) = current {
            let link = self.get(id);
            if link.state != LinkState::Live || link.value != kind || link.data.is_empty() {
                break;
            }
            found.push(id);
            current = self.step(id, direction);
        }
        if direction == Direction::Previous {
            found.reverse();
        }
        found
    }

    /// Mark a live link as the source of a node
    pub fn claim(&mut self, id: LinkId) {
        let link = &mut self.links[id.0];
        if link.state == LinkState::Live {
            link.state = LinkState::Claimed;
        }
    }

    /// Clear a link's data and value and mark it spent, leaving it linked in place
    ///
    /// Returns the data the link held.
    pub fn empty(&mut self, id: LinkId) -> String {
        let link = &mut self.links[id.0];
        if link.state == LinkState::Removed {
            return String::new();
        }
        link.value.clear();
        link.state = LinkState::Emptied;
        std::mem::take(&mut link.data)
    }

    /// Splice a link out, relinking its neighbours to each other
    ///
    /// Returns the link that followed it. Removing an already removed link does nothing.
    pub fn remove(&mut self, id: LinkId) -> Option<LinkId> {
        if self.state(id) == LinkState::Removed {
            return None;
        }
        let previous = self.links[id.0].previous.take();
        let next = self.links[id.0].next.take();
        if let Some(previous) = previous {
            self.links[previous.0].next = next;
        }
        if let Some(next) = next {
            self.links[next.0].previous = previous;
        }
        self.links[id.0].state = LinkState::Removed;
        next
    }

    /// Links reachable from `from`, following `next`
    pub fn iter(&self, from: LinkId) -> SequenceIter<'_> {
        SequenceIter {
            sequence: self,
            current: Some(from),
        }
    }

    /// Remove every link with empty data in the chain starting at `first`
    ///
    /// Returns the first link left, if any. Meant for `finalize` hooks that drop sentinels
    /// and emptied placeholders.
    pub fn prune_empty(&mut self, first: LinkId) -> Option<LinkId> {
        let mut head = None;
        let mut current = Some(first);
        while let Some(id) = current {
            if self.data(id).is_empty() {
                current = self.remove(id);
            } else {
                head.get_or_insert(id);
                current = self.next(id);
            }
        }
        head
    }

    /// Copy the chain starting at `from` back into raw tokens
    pub fn to_tokens(&self, from: LinkId) -> Vec<RawToken> {
        self.iter(from)
            .map(|id| {
                let link = self.get(id);
                RawToken {
                    data: link.data.clone(),
                    value: link.value.clone(),
                }
            })
            .collect()
    }
}

/// Iterator over links following `next`
pub struct SequenceIter<'a> {
    sequence: &'a Sequence,
    current: Option<LinkId>,
}

impl Iterator for SequenceIter<'_> {
    type Item = LinkId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.sequence.next(id);
        Some(id)
    }
}
