//! Concurrent per-item top-K index.
//!
//! The index keeps, for every tracked item, the K highest-support closed
//! patterns seen so far. It is both the eventual output (drained into a
//! [`PatternSink`] after the scheduler joins) and the live pruning oracle
//! the scheduler consults mid-search (via [`TopKIndex::as_selector`]).
//!
//! # Layout and locking
//!
//! One fixed-length slot array per item, sorted descending by support and
//! front-packed, mutated in place under a per-item lock. Arrays are
//! pre-allocated for every item registered at construction, so no allocation
//! or map mutation races exist mid-search; there is no global lock anywhere.
//! `bound()` is called far more often than `insert()` and reads a padded
//! atomic mirror of the K-th slot's support instead of touching the array.

mod limiter;
mod placeholder;

pub use limiter::ExplorationLimiter;
pub use placeholder::PatternPlaceholder;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ahash::{AHashMap, AHashSet};
use crossbeam_utils::CachePadded;

use crate::selector::Selector;
use crate::sink::PatternSink;

/// Admission threshold for one item, as seen by the pruning oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Item not tracked by the index; explore freely.
    Untracked,
    /// The item's list still has room; explore freely.
    NotFull,
    /// The list is full; a candidate must strictly beat this support to
    /// enter.
    Threshold(u32),
}

/// One item's result list.
struct PerItemTopK {
    /// Front-packed, sorted descending by support. Length K.
    slots: Mutex<Box<[Option<Arc<PatternPlaceholder>>]>>,
    /// Mirror of the K-th slot's support; 0 while the list is not full.
    ///
    /// Refreshed under the slot lock on every accepted insert or eviction,
    /// so readers get a single-load snapshot without contending on the lock.
    floor: CachePadded<AtomicU32>,
    /// The item's own support in the dataset. Caps the support any future
    /// pattern containing the item can reach.
    item_support: u32,
}

impl PerItemTopK {
    fn new(k: usize, item_support: u32) -> Self {
        Self {
            slots: Mutex::new(vec![None; k].into_boxed_slice()),
            floor: CachePadded::new(AtomicU32::new(0)),
            item_support,
        }
    }
}

/// The per-item top-K index.
///
/// Registration happens once, at construction; inserts targeting
/// unregistered items are silently ignored, which is how group-restricted
/// mining limits output to a subset of items.
pub struct TopKIndex {
    k: usize,
    unique_output: bool,
    items: AHashMap<u32, PerItemTopK>,
    /// Registered item ids, ascending. Drain order, and the scan universe
    /// for the pruning oracle.
    tracked: Vec<u32>,
}

impl TopKIndex {
    /// Builds an index tracking the given `(item, support)` pairs with
    /// result lists of length `k`.
    ///
    /// Duplicate registrations keep the first support seen.
    pub fn new(k: usize, unique_output: bool, items: impl IntoIterator<Item = (u32, u32)>) -> Self {
        assert!(k > 0, "k must be >= 1");
        let mut map = AHashMap::new();
        for (item, support) in items {
            map.entry(item).or_insert_with(|| PerItemTopK::new(k, support));
        }
        let mut tracked: Vec<u32> = map.keys().copied().collect();
        tracked.sort_unstable();
        Self {
            k,
            unique_output,
            items: map,
            tracked,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_tracked(&self, item: u32) -> bool {
        self.items.contains_key(&item)
    }

    /// Registered items, ascending.
    pub fn tracked_items(&self) -> &[u32] {
        &self.tracked
    }

    /// The item's dataset support, if tracked.
    pub fn item_support(&self, item: u32) -> Option<u32> {
        self.items.get(&item).map(|e| e.item_support)
    }

    /// Tracked items in `[from, below)`, ascending.
    pub(crate) fn tracked_range(&self, from: u32, below: u32) -> &[u32] {
        let lo = self.tracked.partition_point(|&i| i < from);
        let hi = self.tracked.partition_point(|&i| i < below);
        &self.tracked[lo..hi.max(lo)]
    }

    /// Current admission threshold for `item`. One atomic load; never
    /// touches the slot array.
    pub fn bound(&self, item: u32) -> Bound {
        match self.items.get(&item) {
            None => Bound::Untracked,
            Some(entry) => match entry.floor.load(Ordering::Acquire) {
                0 => Bound::NotFull,
                s => Bound::Threshold(s),
            },
        }
    }

    /// Attempts to insert `placeholder` into `item`'s list.
    ///
    /// Returns whether insertion happened. On success the placeholder's
    /// refcount is incremented; an evicted minimum is released. Bounded
    /// insertion sort: O(K) under the per-item lock.
    pub fn insert(&self, item: u32, placeholder: &Arc<PatternPlaceholder>) -> bool {
        let Some(entry) = self.items.get(&item) else {
            // Unregistered items are outside the mined group; skip.
            return false;
        };
        let mut slots = entry.slots.lock().expect("top-k slot lock poisoned");
        let k = slots.len();
        let mut len = slots.iter().position(Option::is_none).unwrap_or(k);

        if len == k {
            let min = slots[k - 1]
                .as_ref()
                .expect("full list has a last entry")
                .support();
            if placeholder.support() <= min {
                return false;
            }
            let evicted = slots[k - 1].take().expect("full list has a last entry");
            evicted.release();
            len = k - 1;
        }

        // Sorted position: after every entry with support >= the new one,
        // so equal supports keep first-seen order.
        let mut pos = len;
        while pos > 0 {
            let above = slots[pos - 1]
                .as_ref()
                .expect("front-packed prefix")
                .support();
            if above < placeholder.support() {
                pos -= 1;
            } else {
                break;
            }
        }
        for i in (pos..len).rev() {
            slots[i + 1] = slots[i].take();
        }
        slots[pos] = Some(Arc::clone(placeholder));
        placeholder.add_ref();

        if len + 1 == k {
            let floor = slots[k - 1]
                .as_ref()
                .expect("full list has a last entry")
                .support();
            entry.floor.store(floor, Ordering::Release);
        }
        true
    }

    /// The only path by which new results enter the index.
    ///
    /// Creates one placeholder and offers it to the list of every item in
    /// `parent` plus `extension`. The refcount ends at the number of lists
    /// that *accepted* it. The full item list is built only when at least
    /// one list did; candidates rejected everywhere never allocate it.
    ///
    /// `extension` is the internal id used for list lookup;
    /// `extension_original` is the id stored for output. Callers without an
    /// item renaming layer pass the same value for both.
    pub fn precollect(
        &self,
        support: u32,
        parent: &[u32],
        extension: u32,
        extension_original: u32,
    ) -> Arc<PatternPlaceholder> {
        let placeholder = Arc::new(PatternPlaceholder::new(support, extension_original));
        for &item in parent {
            self.insert(item, &placeholder);
        }
        self.insert(extension, &placeholder);
        if placeholder.ref_count() > 0 {
            placeholder.materialize(parent);
        }
        placeholder
    }

    /// Drains every item's list into `sink`, ascending by item id, skipping
    /// empty slots. Returns the number of `collect` calls made.
    ///
    /// Must only run after the scheduler has fully joined; there must be no
    /// concurrent writers.
    pub fn drain(&self, sink: &dyn PatternSink) -> u64 {
        let mut emitted = 0u64;
        let mut seen: Option<AHashSet<Box<[u32]>>> =
            self.unique_output.then(AHashSet::new);
        for &item in &self.tracked {
            let entry = &self.items[&item];
            let slots = entry.slots.lock().expect("top-k slot lock poisoned");
            for placeholder in slots.iter().flatten() {
                let Some(pattern) = placeholder.items() else {
                    debug_assert!(false, "surviving placeholder was never materialized");
                    continue;
                };
                if let Some(seen) = seen.as_mut() {
                    if !seen.insert(pattern.into()) {
                        continue;
                    }
                }
                sink.collect(placeholder.support(), pattern);
                emitted += 1;
            }
        }
        emitted
    }

    /// Per-item support lists, for diagnostics and tests. Ascending by
    /// item; each list descending by support.
    pub fn support_lists(&self) -> Vec<(u32, Vec<u32>)> {
        self.tracked
            .iter()
            .map(|&item| {
                let slots = self.items[&item]
                    .slots
                    .lock()
                    .expect("top-k slot lock poisoned");
                let supports = slots.iter().flatten().map(|p| p.support()).collect();
                (item, supports)
            })
            .collect()
    }

    /// The index's pruning oracle, as one link of a selector chain.
    pub fn as_selector(self: &Arc<Self>) -> Box<dyn Selector> {
        Box::new(ExplorationLimiter::new(Arc::clone(self)))
    }
}
