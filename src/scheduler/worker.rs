//! Worker loop, job stacks, and the stealing protocol.
//!
//! Each worker owns a stack of search-tree nodes; the tail entry is the
//! deepest node and the one the owner expands. Stack discipline:
//!
//! - only the owning worker pushes or pops, always at the tail, under its
//!   write lock;
//! - a thief takes the read lock only long enough to copy out the entry
//!   handles, then works through them shallowest first, since stealing near
//!   the root hands over the largest subtrees;
//! - every `advance` call, owner's or thief's, goes through the entry's
//!   checkout lock, so no node ever sees two callers inside `advance` at
//!   once. The owner waits for a thief to finish with its tail entry; a
//!   thief skips entries that are already checked out;
//! - a stolen entry is never removed from the victim's stack; the theft is
//!   the `advance` call itself, and the resulting child goes onto the
//!   thief's own stack.
//!
//! A worker terminates when its stack is empty and one full sweep over
//! every other stack steals nothing. Exiting while another worker still
//! holds jobs is benign: a live node stays on its owner's stack until
//! exhausted, so no node is lost and none is expanded twice.

use std::sync::{Arc, Mutex, RwLock, TryLockError};

#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::search::{ExpansionMemo, SearchNode};
use crate::selector::{Candidate, SelectorChain};
use crate::topk::TopKIndex;

use super::counters::WorkerCounters;

/// One stack entry: a node plus the expansion memo its pruning scans share.
///
/// The memo is on the stack entry rather than the node so a thief advancing
/// the node benefits from (and contributes to) the same first-parent and
/// watermark state as the owner.
pub(crate) struct StackedJob<N> {
    pub(crate) node: Arc<N>,
    pub(crate) memo: ExpansionMemo,
    /// Serializes `advance` dispatch on this entry between the owner and
    /// any thief holding a handle to it.
    gate: Mutex<()>,
    #[cfg(debug_assertions)]
    in_advance: AtomicBool,
}

impl<N> StackedJob<N> {
    pub(crate) fn new(node: Arc<N>) -> Self {
        Self {
            node,
            memo: ExpansionMemo::new(),
            gate: Mutex::new(()),
            #[cfg(debug_assertions)]
            in_advance: AtomicBool::new(false),
        }
    }
}

impl<N: SearchNode> StackedJob<N> {
    fn advance_exclusive(&self) -> Option<Arc<N>> {
        #[cfg(debug_assertions)]
        assert!(
            !self.in_advance.swap(true, Ordering::SeqCst),
            "two callers inside advance() of one search node"
        );
        let child = self.node.advance(&self.memo);
        #[cfg(debug_assertions)]
        self.in_advance.store(false, Ordering::SeqCst);
        child
    }

    /// Owner path: waits out a thief currently inside the node.
    fn advance_owned(&self) -> Option<Arc<N>> {
        let _checkout = self.gate.lock().expect("advance gate poisoned");
        self.advance_exclusive()
    }

    /// Thief path: `None` when the entry is checked out elsewhere,
    /// `Some(advance result)` otherwise.
    fn try_advance(&self) -> Option<Option<Arc<N>>> {
        match self.gate.try_lock() {
            Ok(_checkout) => Some(self.advance_exclusive()),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(_)) => panic!("advance gate poisoned"),
        }
    }
}

/// State shared by all workers for one run.
pub(crate) struct SharedRun<N> {
    pub(crate) stacks: Box<[RwLock<Vec<Arc<StackedJob<N>>>>]>,
    pub(crate) index: Arc<TopKIndex>,
    pub(crate) chain: SelectorChain,
}

impl<N: SearchNode> SharedRun<N> {
    /// Builds the per-worker stacks with the root on worker 0.
    pub(crate) fn new(
        workers: usize,
        root: Arc<N>,
        index: Arc<TopKIndex>,
        chain: SelectorChain,
    ) -> Self {
        let mut stacks = Vec::with_capacity(workers);
        stacks.push(RwLock::new(vec![Arc::new(StackedJob::new(root))]));
        for _ in 1..workers {
            stacks.push(RwLock::new(Vec::new()));
        }
        Self {
            stacks: stacks.into_boxed_slice(),
            index,
            chain,
        }
    }
}

/// Main worker loop: depth-first local expansion, stealing when idle.
pub(crate) fn worker_loop<N: SearchNode>(
    id: usize,
    shared: &SharedRun<N>,
    counters: &mut WorkerCounters,
) {
    log::debug!("miner-worker-{id} starting");
    loop {
        let top = shared.stacks[id]
            .read()
            .expect("job stack lock poisoned")
            .last()
            .cloned();

        match top {
            Some(job) => match job.advance_owned() {
                Some(child) => {
                    counters.nodes_created += 1;
                    if let Some(next) = expand(&child, &job, shared, counters) {
                        shared.stacks[id]
                            .write()
                            .expect("job stack lock poisoned")
                            .push(next);
                    }
                }
                None => {
                    // Exhausted: only the owner pops, so the tail is still
                    // this job.
                    let popped = shared.stacks[id]
                        .write()
                        .expect("job stack lock poisoned")
                        .pop();
                    debug_assert!(popped.is_some());
                    counters.nodes_finished += 1;
                    counters.wrong_first_parents += job.node.wrong_first_parent_count();
                }
            },
            None => match steal(id, shared, counters) {
                Some(job) => shared.stacks[id]
                    .write()
                    .expect("job stack lock poisoned")
                    .push(job),
                None => break,
            },
        }
    }
    log::debug!("miner-worker-{id} exiting");
}

/// Admits a freshly advanced child: selector check, then report to the
/// top-K index, then wrap it as a stack entry. Returns `None` when the
/// chain refuses the branch.
fn expand<N: SearchNode>(
    child: &Arc<N>,
    parent: &StackedJob<N>,
    shared: &SharedRun<N>,
    counters: &mut WorkerCounters,
) -> Option<Arc<StackedJob<N>>> {
    let candidate = Candidate {
        extension: child.extension(),
        support: child.support(),
        pattern: parent.node.pattern(),
        memo: &parent.memo,
    };
    if !shared.chain.allows(&candidate) {
        counters.selector_prunes += 1;
        return None;
    }

    let pattern = child.pattern();
    let extension = child.extension();
    let mut closure_parent = Vec::with_capacity(pattern.len().saturating_sub(1));
    closure_parent.extend(pattern.iter().copied().filter(|&i| i != extension));

    let placeholder = shared.index.precollect(
        child.support(),
        &closure_parent,
        extension,
        child.extension_original(),
    );
    if placeholder.ref_count() == 0 {
        counters.topk_rejections += 1;
    } else {
        counters.patterns_collected += 1;
    }

    Some(Arc::new(StackedJob::new(Arc::clone(child))))
}

/// One sweep over the other workers' stacks, shallowest entries first.
///
/// Each victim entry is advanced until it yields an admitted child (the
/// stolen job), is exhausted, or turns out to be checked out by another
/// caller, in which case the thief moves on. Pruned children are dropped
/// and the entry is retried; the owner will eventually pop it.
fn steal<N: SearchNode>(
    id: usize,
    shared: &SharedRun<N>,
    counters: &mut WorkerCounters,
) -> Option<Arc<StackedJob<N>>> {
    let n = shared.stacks.len();
    for offset in 1..n {
        let victim = (id + offset) % n;
        // Hold the read lock only long enough to copy the entry handles.
        let jobs: Vec<Arc<StackedJob<N>>> = shared.stacks[victim]
            .read()
            .expect("job stack lock poisoned")
            .iter()
            .cloned()
            .collect();

        for job in jobs {
            counters.steal_attempts += 1;
            loop {
                let child = match job.try_advance() {
                    Some(Some(child)) => child,
                    // Exhausted, or busy under another caller right now.
                    Some(None) | None => break,
                };
                counters.nodes_created += 1;
                if let Some(next) = expand(&child, &job, shared, counters) {
                    counters.steal_successes += 1;
                    return Some(next);
                }
            }
        }
    }
    None
}
