//! Seed-driven synthetic search trees.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::search::{ExpansionMemo, SearchNode};

/// Shape parameters for a synthetic tree.
#[derive(Clone, Copy, Debug)]
pub struct TreeShape {
    /// Item universe `0..items`.
    pub items: u32,
    /// Support of the (empty) root pattern.
    pub root_support: u32,
    /// Maximum pattern-growth depth; nodes at this depth have no children.
    pub max_depth: usize,
    /// Give a hash-chosen subset of items a blocker item, making their
    /// first-parent test fail wherever the blocker is absent.
    pub first_parent_failures: bool,
    /// Occasionally absorb one extra item into a child's closure.
    pub closure_extensions: bool,
    /// Seed for all hash-derived decisions.
    pub seed: u64,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            items: 8,
            root_support: 100,
            max_depth: 4,
            first_parent_failures: true,
            closure_extensions: true,
            seed: 0x5eed_1e55_c0ff_ee21,
        }
    }
}

/// SplitMix64-style finalizer over the seed, the pattern, and the extension.
///
/// Depends only on values, never on traversal state, which is what makes
/// the tree identical across thread counts.
fn mix(seed: u64, pattern: &[u32], extension: u32) -> u64 {
    let mut h = seed ^ 0x9E37_79B9_7F4A_7C15u64.wrapping_mul(extension as u64 + 1);
    for &item in pattern {
        h ^= (item as u64)
            .wrapping_add(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(h << 6)
            .wrapping_add(h >> 2);
    }
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

fn insert_sorted(items: &mut Vec<u32>, item: u32) {
    let pos = items.partition_point(|&i| i < item);
    debug_assert!(items.get(pos) != Some(&item));
    items.insert(pos, item);
}

/// One node of a synthetic tree.
///
/// Candidates are scanned in ascending item id; each child's own candidates
/// stay strictly below its extension, so a subtree only ever adds items
/// below the extension that opened it. That mirrors the prefix discipline
/// the pruning oracle's future-item scan assumes.
///
/// The candidate cursor sits behind a mutex, so `advance` is safe for any
/// caller; the scheduler's stealing discipline keeps contention negligible.
pub struct SyntheticNode {
    shape: Arc<TreeShape>,
    pattern: Box<[u32]>,
    support: u32,
    extension: u32,
    depth: usize,
    /// Next candidate extension id, counting up to the boundary.
    cursor: Mutex<u32>,
    wrong_first_parents: AtomicU64,
}

impl SyntheticNode {
    /// The root node: empty pattern, full support, every item a candidate.
    pub fn root(shape: TreeShape) -> Arc<Self> {
        Arc::new(Self {
            shape: Arc::new(shape),
            pattern: Box::default(),
            support: shape.root_support,
            extension: u32::MAX,
            depth: 0,
            cursor: Mutex::new(0),
            wrong_first_parents: AtomicU64::new(0),
        })
    }

    /// Exclusive upper end of this node's candidate range.
    fn boundary(&self) -> u32 {
        self.extension.min(self.shape.items)
    }

    /// The item that keeps `item` out of any pattern lacking it, if one was
    /// assigned. Blockers are always above the item they block, and an item
    /// with a blocker is never absorbed by closure, so a failed candidate
    /// stays failed everywhere below until its blocker joins the pattern.
    fn blocker(&self, item: u32) -> Option<u32> {
        if !self.shape.first_parent_failures {
            return None;
        }
        let span = self.shape.items - item - 1;
        if span == 0 {
            return None;
        }
        let h = mix(self.shape.seed ^ 0xb10c_b10c, &[], item);
        (h % 3 == 0).then(|| item + 1 + ((h >> 8) % span as u64) as u32)
    }

    fn child(&self, pattern: Vec<u32>, support: u32, extension: u32) -> Arc<Self> {
        Arc::new(Self {
            shape: Arc::clone(&self.shape),
            pattern: pattern.into_boxed_slice(),
            support,
            extension,
            depth: self.depth + 1,
            cursor: Mutex::new(0),
            wrong_first_parents: AtomicU64::new(0),
        })
    }
}

impl SearchNode for SyntheticNode {
    fn advance(&self, memo: &ExpansionMemo) -> Option<Arc<Self>> {
        if self.depth >= self.shape.max_depth {
            return None;
        }
        let boundary = self.boundary();
        let mut cursor = self.cursor.lock().expect("candidate cursor lock poisoned");
        loop {
            let extension = *cursor;
            if extension >= boundary {
                return None;
            }
            *cursor += 1;

            // Items already absorbed by a closure are not candidates.
            if self.pattern.contains(&extension) {
                continue;
            }

            if let Some(blocker) = self.blocker(extension) {
                if !self.pattern.contains(&blocker) {
                    memo.record_failed_parent(extension, blocker);
                    self.wrong_first_parents.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            }

            let h = mix(self.shape.seed, &self.pattern, extension);

            // A slice of candidates is simply infrequent and silently
            // skipped.
            if h % 11 == 3 {
                continue;
            }

            // Support shrinks along the path but stays positive.
            let drop = ((h >> 16) % self.support as u64) as u32;
            let support = self.support - drop;

            let mut items = Vec::with_capacity(self.pattern.len() + 2);
            items.extend_from_slice(&self.pattern);
            insert_sorted(&mut items, extension);
            if self.shape.closure_extensions && extension > 0 && h % 5 == 0 {
                // Closure may absorb one unblocked item below the extension.
                let extra = ((h >> 24) % extension as u64) as u32;
                if !items.contains(&extra) && self.blocker(extra).is_none() {
                    insert_sorted(&mut items, extra);
                }
            }
            return Some(self.child(items, support, extension));
        }
    }

    fn pattern(&self) -> &[u32] {
        &self.pattern
    }

    fn support(&self) -> u32 {
        self.support
    }

    fn extension(&self) -> u32 {
        self.extension
    }

    fn wrong_first_parent_count(&self) -> u64 {
        self.wrong_first_parents.load(Ordering::Relaxed)
    }
}
