//! Per-worker event counters.
//!
//! Hot-path updates are plain integer ops on a block owned exclusively by
//! one worker, with no atomics or locks. Blocks are cache-line aligned so
//! workers stored contiguously never share a line. Aggregation happens once,
//! after every worker has joined, so the merge needs no synchronization.

/// Event counters owned by one worker.
///
/// NOT thread-safe; each worker owns its block exclusively while running.
/// Merge into a [`CountersSnapshot`] after the pool joins.
#[derive(Clone, Debug, Default)]
#[repr(align(64))]
pub struct WorkerCounters {
    /// Search states produced by `advance` (owner expansions and steals).
    pub nodes_created: u64,
    /// Search states fully expanded and popped.
    pub nodes_finished: u64,
    /// Patterns accepted by at least one top-K list.
    pub patterns_collected: u64,
    /// Patterns accepted by no list (precollect refcount ended at zero).
    pub topk_rejections: u64,
    /// Branches refused by the selector chain.
    pub selector_prunes: u64,
    /// Candidates rejected by the first-parent test, harvested at pop time.
    pub wrong_first_parents: u64,
    /// Victim stack entries examined while stealing.
    pub steal_attempts: u64,
    /// Steals that produced a job.
    pub steal_successes: u64,
}

const _: () = {
    assert!(std::mem::align_of::<WorkerCounters>() >= 64);
};

impl WorkerCounters {
    pub const fn new() -> Self {
        Self {
            nodes_created: 0,
            nodes_finished: 0,
            patterns_collected: 0,
            topk_rejections: 0,
            selector_prunes: 0,
            wrong_first_parents: 0,
            steal_attempts: 0,
            steal_successes: 0,
        }
    }
}

/// Aggregated counters from all workers plus run-level fields.
///
/// Built single-threaded after the pool joins; read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct CountersSnapshot {
    pub nodes_created: u64,
    pub nodes_finished: u64,
    pub patterns_collected: u64,
    pub topk_rejections: u64,
    pub selector_prunes: u64,
    pub wrong_first_parents: u64,
    pub steal_attempts: u64,
    pub steal_successes: u64,

    /// Number of workers merged.
    pub worker_count: u32,
    /// Wall-clock run duration in nanoseconds.
    pub duration_ns: u64,
}

impl CountersSnapshot {
    pub const fn new() -> Self {
        Self {
            nodes_created: 0,
            nodes_finished: 0,
            patterns_collected: 0,
            topk_rejections: 0,
            selector_prunes: 0,
            wrong_first_parents: 0,
            steal_attempts: 0,
            steal_successes: 0,
            worker_count: 0,
            duration_ns: 0,
        }
    }

    /// Accumulates one worker's counters. Call once per worker.
    pub fn merge_worker(&mut self, w: &WorkerCounters) {
        self.nodes_created = self.nodes_created.wrapping_add(w.nodes_created);
        self.nodes_finished = self.nodes_finished.wrapping_add(w.nodes_finished);
        self.patterns_collected = self.patterns_collected.wrapping_add(w.patterns_collected);
        self.topk_rejections = self.topk_rejections.wrapping_add(w.topk_rejections);
        self.selector_prunes = self.selector_prunes.wrapping_add(w.selector_prunes);
        self.wrong_first_parents = self
            .wrong_first_parents
            .wrapping_add(w.wrong_first_parents);
        self.steal_attempts = self.steal_attempts.wrapping_add(w.steal_attempts);
        self.steal_successes = self.steal_successes.wrapping_add(w.steal_successes);
        self.worker_count = self.worker_count.wrapping_add(1);
    }

    /// `steal_successes / steal_attempts`; 0.0 before any attempt.
    pub fn steal_rate(&self) -> f64 {
        if self.steal_attempts == 0 {
            0.0
        } else {
            self.steal_successes as f64 / self.steal_attempts as f64
        }
    }

    /// Search states expanded per second; 0.0 when duration was not set.
    pub fn nodes_per_sec(&self) -> f64 {
        if self.duration_ns == 0 {
            0.0
        } else {
            self.nodes_created as f64 / (self.duration_ns as f64 / 1_000_000_000.0)
        }
    }
}
