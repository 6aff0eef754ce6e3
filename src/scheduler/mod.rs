//! Work-stealing search scheduler.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────────────┐
//!            │                     Miner                        │
//!            │                                                  │
//!            │   Worker 0        Worker 1        Worker N       │
//!            │  ┌─────────┐     ┌─────────┐     ┌─────────┐     │
//!            │  │ stack   │◄────│ stack   │◄────│ stack   │     │  read-lock
//!            │  │ (DFS)   │────►│ (DFS)   │────►│ (DFS)   │     │  stealing
//!            │  └────┬────┘     └────┬────┘     └────┬────┘     │
//!            │       │               │               │          │
//!            │       ▼               ▼               ▼          │
//!            │  SelectorChain ──► TopKIndex (per-item locks)    │
//!            │                        │                         │
//!            │                        ▼  (after join)           │
//!            │                   PatternSink                    │
//!            └──────────────────────────────────────────────────┘
//! ```
//!
//! No central queue and no global lock: worker stacks are stolen from in
//! place under per-stack read locks, and the only structure every worker
//! mutates is the top-K index, which locks per item.
//!
//! # Correctness invariants
//!
//! - each reachable search-tree node is produced by exactly one `advance`
//!   call, whoever makes it;
//! - `advance` dispatch is checked out per stack entry, so an owner and a
//!   thief are never inside the same node at once;
//! - workers exit only when no job is findable anywhere, and jobs are never
//!   re-created, so the pool terminates on any finite tree;
//! - a worker panic is captured (first one wins) and surfaced as an error
//!   after the join; the index is not drained, so a failed run can never
//!   look like a successful empty one.

mod counters;
mod worker;

pub use counters::{CountersSnapshot, WorkerCounters};

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::config::MinerConfig;
use crate::error::{ConfigError, RunError};
use crate::search::SearchNode;
use crate::selector::{Selector, SelectorChain};
use crate::sink::PatternSink;
use crate::topk::TopKIndex;

use worker::{worker_loop, SharedRun};

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Aggregated per-worker counters.
    pub counters: CountersSnapshot,
    /// Number of patterns handed to the sink at drain time.
    pub emitted: u64,
}

/// The mining driver: spawns the worker pool, joins it, drains the index.
pub struct Miner {
    cfg: MinerConfig,
}

impl Miner {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration is invalid; nothing
    /// is spawned in that case.
    pub fn new(cfg: MinerConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MinerConfig {
        &self.cfg
    }

    /// Runs the default pipeline: the given selectors in order, then the
    /// index's own top-K pruning oracle as the last link.
    pub fn run<N: SearchNode>(
        &self,
        root: Arc<N>,
        index: Arc<TopKIndex>,
        selectors: Vec<Box<dyn Selector>>,
        sink: &dyn PatternSink,
    ) -> Result<RunReport, RunError> {
        let mut chain = SelectorChain::new();
        for s in selectors {
            chain.push(s);
        }
        chain.push(index.as_selector());
        self.run_with_chain(root, index, chain, sink)
    }

    /// Runs with an explicit selector chain (possibly empty, meaning no
    /// pruning at all).
    pub fn run_with_chain<N: SearchNode>(
        &self,
        root: Arc<N>,
        index: Arc<TopKIndex>,
        chain: SelectorChain,
        sink: &dyn PatternSink,
    ) -> Result<RunReport, RunError> {
        let workers = self.cfg.workers;
        let shared = SharedRun::new(workers, root, Arc::clone(&index), chain);
        let started = Instant::now();

        let mut snapshot = CountersSnapshot::new();
        let mut first_panic: Option<RunError> = None;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for id in 0..workers {
                let shared = &shared;
                let handle = thread::Builder::new()
                    .name(format!("miner-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        let mut counters = WorkerCounters::new();
                        worker_loop(id, shared, &mut counters);
                        counters
                    })
                    .expect("failed to spawn worker thread");
                handles.push(handle);
            }

            for (id, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(counters) => snapshot.merge_worker(&counters),
                    Err(payload) => {
                        if first_panic.is_none() {
                            first_panic = Some(RunError::worker_panicked(id, payload));
                        }
                    }
                }
            }
        });

        if let Some(err) = first_panic {
            log::error!("mining run aborted: {err}");
            return Err(err);
        }

        snapshot.duration_ns = started.elapsed().as_nanos() as u64;
        let emitted = index.drain(sink);
        log::info!(
            "mined {} nodes with {} workers in {:.3}s: {} patterns emitted, \
             {} pruned branches, steal rate {:.3}",
            snapshot.nodes_created,
            snapshot.worker_count,
            snapshot.duration_ns as f64 / 1e9,
            emitted,
            snapshot.selector_prunes,
            snapshot.steal_rate(),
        );

        Ok(RunReport {
            counters: snapshot,
            emitted,
        })
    }
}
