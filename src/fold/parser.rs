//! The parse loop
//!
//!     [Parser] drives a token stream through a [Classifier] and threads the result into a
//!     [Sequence]. The loop itself only tracks the last link produced; everything that decides
//!     what a token becomes lives in the classifier, which grammars implement as a state
//!     machine over token kinds ("inside a block of kind X, waiting for a Y").
//!
//!     Each call to [Parser::parse]:
//!
//!         1. pushes an empty sentinel link, used as both first and last;
//!         2. calls `classify` for every token, in order, keeping the returned link as last;
//!         3. hands the first link to `finalize`, which may drop sentinels or merge links;
//!         4. records first (only if none was recorded yet) and last on the driver.
//!
//!     A driver that already holds a sequence links the new sentinel after its last link, so
//!     resumed parses extend one continuous sequence.

use crate::fold::sequence::{LinkId, Sequence};
use crate::fold::token::RawToken;
use std::fmt;
use tracing::trace;

/// Pluggable classification and cleanup steps of the parse loop
pub trait Classifier {
    /// Turn `token` into a link of `sequence` and return the link to use as the new last one
    ///
    /// The default copies `data` and `value` into a fresh link threaded right after `last`.
    fn classify(&mut self, sequence: &mut Sequence, token: RawToken, last: LinkId) -> LinkId {
        sequence.push_after(Some(last), token)
    }

    /// Clean up the produced chain and return its (possibly new) first link
    fn finalize(&mut self, _sequence: &mut Sequence, first: LinkId) -> Option<LinkId> {
        Some(first)
    }
}

/// Identity relabeling: every token becomes one link with the same data and value
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl Classifier for DefaultClassifier {}

/// Drops the sentinel and every link without data once the stream is exhausted
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneEmpty;

impl Classifier for PruneEmpty {
    fn finalize(&mut self, sequence: &mut Sequence, first: LinkId) -> Option<LinkId> {
        sequence.prune_empty(first)
    }
}

/// Parse loop driver
#[derive(Debug, Default)]
pub struct Parser<C = DefaultClassifier> {
    classifier: C,
    sequence: Sequence,
    first: Option<LinkId>,
    last: Option<LinkId>,
}

impl Parser<DefaultClassifier> {
    pub fn new() -> Self {
        Parser::with_classifier(DefaultClassifier)
    }
}

impl<C: Classifier> Parser<C> {
    pub fn with_classifier(classifier: C) -> Self {
        Parser {
            classifier,
            sequence: Sequence::new(),
            first: None,
            last: None,
        }
    }

    /// Classify every token of the stream into the driver's sequence
    ///
    /// Returns the first link of the chain produced by this call, after `finalize`.
    pub fn parse<I>(&mut self, tokens: I) -> Option<LinkId>
    where
        I: IntoIterator<Item = RawToken>,
    {
        let sentinel = self.sequence.push_after(self.last, RawToken::default());
        let mut last = sentinel;
        let mut count = 0usize;
        for token in tokens {
            last = self.classifier.classify(&mut self.sequence, token, last);
            count += 1;
        }
        trace!(tokens = count, "classified token stream");

        let first = self.classifier.finalize(&mut self.sequence, sentinel);
        if self.first.is_none() {
            self.first = first;
        }
        self.last = self.settle_last(last, first);
        first
    }

    /// First link recorded by the earliest parse
    pub fn first(&self) -> Option<LinkId> {
        self.first
    }

    /// Last link produced by the latest parse
    pub fn last(&self) -> Option<LinkId> {
        self.last
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.sequence
    }

    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    // `finalize` may have removed the last classified link; fall back to the end of the chain.
    fn settle_last(&self, last: LinkId, first: Option<LinkId>) -> Option<LinkId> {
        if self.sequence.is_reachable(last) {
            Some(last)
        } else {
            first.map(|first| self.sequence.tail(first))
        }
    }
}

impl<C> fmt::Display for Parser<C> {
    /// Pretty JSON listing of the links reachable from `first`; empty when nothing was parsed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.first else {
            return Ok(());
        };
        let tokens = self.sequence.to_tokens(first);
        let json = serde_json::to_string_pretty(&tokens).map_err(|_| fmt::Error)?;
        write!(f, "{json}")
    }
}
