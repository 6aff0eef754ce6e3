//! The index's pruning oracle: refuses a branch only when no item's top-K
//! list anywhere could still gain from exploring it.
//!
//! Decision order, cheapest first:
//!
//! 1. the extension item's own bound (one atomic load);
//! 2. the items already in the parent pattern;
//! 3. every other tracked item below the extension, since those are the
//!    items a deeper extension could still add; the stack entry's watermark
//!    skips ranges already proven gain-free and the first-parent failure
//!    map discounts items that can never join this branch.
//!
//! The scan errs toward exploring: any item that might still gain aborts it
//! immediately.

use std::sync::Arc;

use super::{Bound, TopKIndex};
use crate::selector::{Candidate, Selector};

/// [`Selector`] wrapper around a [`TopKIndex`], usually obtained through
/// [`TopKIndex::as_selector`].
pub struct ExplorationLimiter {
    index: Arc<TopKIndex>,
}

impl ExplorationLimiter {
    pub fn new(index: Arc<TopKIndex>) -> Self {
        Self { index }
    }

    /// Could a pattern containing `item`, with support at most
    /// `min(candidate support, the item's own support)`, still enter the
    /// item's list?
    fn could_gain(&self, item: u32, candidate_support: u32) -> bool {
        match self.index.bound(item) {
            Bound::Untracked => false,
            Bound::NotFull => true,
            Bound::Threshold(floor) => {
                let cap = self
                    .index
                    .item_support(item)
                    .map_or(candidate_support, |s| s.min(candidate_support));
                floor < cap
            }
        }
    }
}

impl Selector for ExplorationLimiter {
    fn allows(&self, c: &Candidate<'_>) -> bool {
        // Fast path: the candidate itself can still enter its extension's
        // list. Untracked or not-full extensions always explore freely.
        match self.index.bound(c.extension) {
            Bound::Untracked | Bound::NotFull => return true,
            Bound::Threshold(floor) if floor < c.support => return true,
            Bound::Threshold(_) => {}
        }

        // Items already in the pattern: any list with room or with a floor
        // below the candidate support might still improve.
        for &item in c.pattern {
            match self.index.bound(item) {
                Bound::NotFull => return true,
                Bound::Threshold(floor) if floor < c.support => return true,
                _ => {}
            }
        }

        // Items a deeper extension could still add: tracked items below the
        // candidate. The watermark lets the scan resume past a prefix
        // already proven gain-free at an equal or higher support.
        let wm = c.memo.watermark();
        let start = if wm.at_support >= c.support {
            wm.verified_upto
        } else {
            0
        };

        // `durable` only advances over verifications that hold for every
        // later candidate of this node (pattern membership, full list with
        // a high enough floor). First-parent discounts hold only for the
        // current extension, so they end the durable prefix without ending
        // the scan.
        let mut durable = start;
        let mut durable_broken = false;
        for &item in self.index.tracked_range(start, c.extension) {
            if c.pattern.binary_search(&item).is_ok() || !self.could_gain(item, c.support) {
                if !durable_broken {
                    durable = item + 1;
                }
                continue;
            }
            // The item could gain; it only stays out of this subtree when a
            // recorded first-parent failure names a blocker the subtree can
            // never reach (strictly above the extension, not in the
            // pattern).
            match c.memo.failed_parent(item) {
                Some(parent) if parent > c.extension => durable_broken = true,
                _ => {
                    c.memo.extend_watermark(durable, c.support);
                    return true;
                }
            }
        }

        // A clean scan also covers the untracked gap up to the extension.
        if !durable_broken {
            durable = c.extension;
        }
        c.memo.extend_watermark(durable, c.support);
        false
    }
}
