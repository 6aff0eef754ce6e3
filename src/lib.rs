//! Parallel top-K-per-item closed itemset mining core.
//!
//! ## Scope
//! This crate is the exploration engine of an LCM-family miner: a
//! work-stealing scheduler over search-tree nodes, a concurrent per-item
//! top-K index that doubles as a pruning oracle, and a composable selector
//! chain deciding which branches are worth descending into. Dataset loading
//! and projection live behind the [`SearchNode`] trait, outside this crate.
//!
//! ## Key invariants
//! - Each worker owns a private job stack; thieves advance a victim's
//!   shallowest entries in place and never remove them, so every node is
//!   expanded by exactly one caller at a time and finished by its owner.
//! - Per-item top-K lists are sorted descending by support; the list floor
//!   is mirrored into an atomic so pruning reads take a single load.
//! - Pruning bounds only rise and candidate supports only fall down the
//!   tree, which is what makes bound-based skipping sound.
//! - A pattern's item list is materialized at most once, and only for
//!   patterns at least one top-K list accepted.
//!
//! ## Engine flow (one run)
//! 1) The root node goes onto worker 0's stack.
//! 2) Each worker repeatedly advances its deepest node; admitted children
//!    are reported to the index and pushed.
//! 3) Idle workers sweep the other stacks, shallowest entries first, and
//!    leave once a full sweep steals nothing.
//! 4) After the join, the index drains every item's surviving patterns
//!    into the sink and the merged counters are reported.
//!
//! ## Notable entry points
//! - [`Miner`] / [`MinerConfig`]: configure and drive a run.
//! - [`TopKIndex`]: the per-item result store and pruning oracle.
//! - [`SearchNode`]: the contract dataset backends implement.
//! - [`Selector`] / [`SelectorChain`]: branch admission.
//! - [`sim`]: deterministic synthetic trees for tests and benchmarks.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod search;
pub mod selector;
pub mod sim;
pub mod sink;
pub mod topk;

pub use config::MinerConfig;
pub use error::{ConfigError, RunError};
pub use scheduler::{CountersSnapshot, Miner, RunReport};
pub use search::{ExpansionMemo, SearchNode, Watermark};
pub use selector::{Candidate, Selector, SelectorChain};
pub use sink::{
    FilePatternSink, NullPatternSink, PatternSink, StdoutPatternSink, VecPatternSink,
};
pub use topk::{Bound, ExplorationLimiter, PatternPlaceholder, TopKIndex};
