//! Deterministic simulation support.
//!
//! Synthetic, seed-driven search trees implementing [`SearchNode`], plus a
//! single-threaded reference explorer mirroring the scheduler's expansion
//! semantics. The trees are not backed by a dataset; they exist to exercise
//! the scheduler, the selector chain, and the top-K index under fully
//! reproducible shapes:
//!
//! - the same `TreeShape` yields the same tree regardless of traversal
//!   order or thread count, because every child is a pure function of
//!   `(seed, parent pattern, extension)` and the parent's support;
//! - supports never increase along a path and every subtree only adds
//!   items below the extension that opened it, the property the pruning
//!   oracle's future-item scan relies on;
//! - first-parent failures are blocker-based and therefore hereditary: a
//!   blocked item stays out of every pattern its blocker cannot join,
//!   which keeps bound-based pruning lossless on these trees.
//!
//! [`SearchNode`]: crate::search::SearchNode

mod reference;
mod tree;

pub use reference::explore_sequential;
pub use tree::{SyntheticNode, TreeShape};
