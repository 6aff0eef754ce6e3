//! Search-tree node contract and per-stack-entry expansion memo.
//!
//! A [`SearchNode`] is one node of the closed-itemset search tree: a pattern
//! already known to be closed and frequent, plus a lazily-advancing cursor
//! over candidate extension items. The dataset projection machinery behind
//! `advance` lives outside this crate; the scheduler only needs the contract
//! below.
//!
//! # Concurrency contract
//!
//! The scheduler routes every `advance` call through a per-stack-entry
//! checkout lock, so a node never sees two callers inside `advance` at
//! once. `advance` still takes `&self`, so implementations keep their
//! candidate cursor behind interior mutability (a `Mutex` is enough), but
//! they may assume single-caller semantics.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;

/// One node of the search tree.
///
/// `pattern()` is the node's full closed itemset, ordered strictly
/// increasing by internal item id. `extension()` is the item whose extension
/// created this node; it is contained in `pattern()` and is meaningless on
/// the root (whose pattern is empty and which is never collected).
pub trait SearchNode: Send + Sync + 'static {
    /// Produces the next child node, already support-counted and
    /// closure-extended, or `None` once the candidate cursor is exhausted.
    ///
    /// First-parent test failures discovered while scanning candidates are
    /// reported into `memo` so later pruning scans can skip the failed
    /// items.
    fn advance(&self, memo: &ExpansionMemo) -> Option<Arc<Self>>
    where
        Self: Sized;

    /// The node's closed pattern, strictly increasing by internal item id.
    fn pattern(&self) -> &[u32];

    /// Number of transactions containing the pattern.
    fn support(&self) -> u32;

    /// Internal id of the extension item that created this node.
    fn extension(&self) -> u32;

    /// Original (pre-renaming) id of the extension item.
    ///
    /// Implementations without an item renaming layer return the internal
    /// id unchanged.
    fn extension_original(&self) -> u32 {
        self.extension()
    }

    /// Cumulative count of candidates this node rejected via the
    /// first-parent test. Harvested once, when the owning worker pops the
    /// exhausted node.
    fn wrong_first_parent_count(&self) -> u64 {
        0
    }
}

/// Monotone scan watermark for the pruning oracle.
///
/// Records that extension ids in `[0, verified_upto)` have been proven
/// unable to gain from further exploration of this node's subtree, for any
/// candidate support `<= at_support`. Per-item bounds only rise and
/// candidate supports only fall down the tree, so the claim stays valid
/// once made.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Watermark {
    /// Exclusive upper end of the verified id range. 0 = nothing verified.
    pub verified_upto: u32,
    /// Largest candidate support the verification holds for.
    pub at_support: u32,
}

/// Per-stack-entry memo shared by the owning worker and any thief.
///
/// Holds the first-parent failure map (extension item -> the parent item
/// that caused the failure) and the pruning-scan [`Watermark`]. Both are
/// hints: losing an update costs a re-scan, never correctness.
#[derive(Debug, Default)]
pub struct ExpansionMemo {
    failed: Mutex<AHashMap<u32, u32>>,
    watermark: Mutex<Watermark>,
}

impl ExpansionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `item` failed the first-parent test because of `parent`.
    pub fn record_failed_parent(&self, item: u32, parent: u32) {
        self.failed
            .lock()
            .expect("first-parent memo lock poisoned")
            .insert(item, parent);
    }

    /// The parent item that made `item` fail the first-parent test, if any.
    pub fn failed_parent(&self, item: u32) -> Option<u32> {
        self.failed
            .lock()
            .expect("first-parent memo lock poisoned")
            .get(&item)
            .copied()
    }

    /// Snapshot of the current watermark.
    pub fn watermark(&self) -> Watermark {
        *self.watermark.lock().expect("watermark lock poisoned")
    }

    /// Advances the watermark to `{verified_upto, at_support}`.
    ///
    /// Applied only when `verified_upto` is strictly greater than the stored
    /// one: last-writer-wins-by-progress, tolerant of concurrent advancing
    /// threads.
    pub fn extend_watermark(&self, verified_upto: u32, at_support: u32) {
        let mut wm = self.watermark.lock().expect("watermark lock poisoned");
        if verified_upto > wm.verified_upto {
            *wm = Watermark {
                verified_upto,
                at_support,
            };
        }
    }
}
