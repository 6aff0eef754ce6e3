//! Pluggable admission predicates consulted before a branch is expanded.
//!
//! A [`Selector`] answers one question: could exploring this candidate
//! extension still produce a pattern competitive for *any* item's top-K?
//! Selectors compose into an ordered [`SelectorChain`] that short-circuits
//! on the first link refusing exploration. Structural predicates (symmetry
//! breaking and the like) go in front; the top-K bound oracle built by
//! [`TopKIndex::as_selector`](crate::TopKIndex::as_selector) usually sits
//! last.

use crate::search::ExpansionMemo;

/// A candidate branch, as seen by selectors.
///
/// `pattern` is the *parent* pattern the extension would be applied to,
/// strictly increasing by internal item id. `memo` belongs to the parent's
/// stack entry and carries the first-parent failure map plus the scan
/// watermark.
pub struct Candidate<'a> {
    /// Internal id of the proposed extension item.
    pub extension: u32,
    /// Support of the extended pattern.
    pub support: u32,
    /// The parent pattern being extended.
    pub pattern: &'a [u32],
    /// The parent stack entry's expansion memo.
    pub memo: &'a ExpansionMemo,
}

/// One admission predicate.
///
/// Implementations must be cheap relative to dataset projection: the whole
/// point of the chain is to refuse a branch before the expensive work runs.
/// Selectors must err toward allowing; refusing is only sound when the
/// branch provably cannot improve any item's result list.
pub trait Selector: Send + Sync + 'static {
    /// Returns false when the branch can be skipped entirely.
    fn allows(&self, candidate: &Candidate<'_>) -> bool;
}

/// Ordered chain of selectors, short-circuiting on the first refusal.
#[derive(Default)]
pub struct SelectorChain {
    links: Vec<Box<dyn Selector>>,
}

impl SelectorChain {
    /// An empty chain; allows everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a selector to the end of the chain.
    pub fn push(&mut self, selector: Box<dyn Selector>) {
        self.links.push(selector);
    }

    /// True when every link allows the candidate.
    pub fn allows(&self, candidate: &Candidate<'_>) -> bool {
        self.links.iter().all(|s| s.allows(candidate))
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
