//! Reference-counted, lazily-materialized candidate results.
//!
//! A placeholder is created once per discovered closed pattern, *before* its
//! full item list exists, and shared by reference across the top-K lists of
//! every item that accepted it. The item list is only built once the
//! placeholder is known to have survived at least one insertion; candidates
//! rejected everywhere never allocate it.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// A provisional mining result.
///
/// Lifecycle: created (refcount = number of accepting lists) -> referenced
/// -> possibly ejected (refcount decremented per eviction) -> materialized
/// (item list assigned, only while still referenced) -> emitted at drain, or
/// discarded when the refcount reaches zero first.
#[derive(Debug)]
pub struct PatternPlaceholder {
    support: u32,
    extension: u32,
    items: OnceLock<Box<[u32]>>,
    refs: AtomicU32,
}

impl PatternPlaceholder {
    /// A fresh, unreferenced, unmaterialized placeholder.
    ///
    /// `extension` is the original id of the extension item; it joins the
    /// parent pattern at materialization time.
    pub fn new(support: u32, extension: u32) -> Self {
        debug_assert!(support > 0, "frequent patterns have positive support");
        Self {
            support,
            extension,
            items: OnceLock::new(),
            refs: AtomicU32::new(0),
        }
    }

    pub fn support(&self) -> u32 {
        self.support
    }

    /// Original id of the extension item this placeholder was created for.
    pub fn extension(&self) -> u32 {
        self.extension
    }

    /// Number of top-K lists currently holding this placeholder.
    pub fn ref_count(&self) -> u32 {
        self.refs.load(Ordering::Acquire)
    }

    /// One more list holds the placeholder. Called under that list's lock.
    pub(crate) fn add_ref(&self) {
        self.refs.fetch_add(1, Ordering::AcqRel);
    }

    /// One list evicted the placeholder. Called under that list's lock.
    pub(crate) fn release(&self) {
        let prev = self.refs.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "released an unreferenced placeholder");
    }

    /// Builds the full item list as `parent` plus the extension item,
    /// keeping ascending order. Idempotent; later calls are no-ops.
    pub(crate) fn materialize(&self, parent: &[u32]) {
        self.items.get_or_init(|| {
            let pos = parent.partition_point(|&i| i < self.extension);
            debug_assert!(
                parent.get(pos) != Some(&self.extension),
                "extension item already in parent pattern"
            );
            let mut items = Vec::with_capacity(parent.len() + 1);
            items.extend_from_slice(&parent[..pos]);
            items.push(self.extension);
            items.extend_from_slice(&parent[pos..]);
            items.into_boxed_slice()
        });
    }

    /// The materialized item list, or `None` while unmaterialized.
    pub fn items(&self) -> Option<&[u32]> {
        self.items.get().map(Box::as_ref)
    }
}
