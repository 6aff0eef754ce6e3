//! Error types for miner configuration and runs.
//!
//! Errors are stage-specific: configuration problems are rejected before any
//! thread is spawned, run failures are reported after the pool has been
//! joined. All enums are `#[non_exhaustive]` so variants can be added without
//! breaking callers; consumers should include a fallback match arm.

use std::fmt;

/// Errors from [`MinerConfig`](crate::MinerConfig) validation.
///
/// Invalid values are never clamped; construction fails instead.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// Worker count must be at least 1.
    InvalidWorkers { got: usize },
    /// K (per-item result list length) must be at least 1.
    InvalidK { got: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWorkers { got } => {
                write!(f, "worker count must be >= 1, got {got}")
            }
            Self::InvalidK { got } => write!(f, "k must be >= 1, got {got}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from a mining run.
///
/// A run that returns an error has NOT drained the top-K index: no pattern
/// was emitted, so a failed run is always distinguishable from a completed
/// run with zero results.
#[derive(Debug)]
#[non_exhaustive]
pub enum RunError {
    /// A worker thread panicked. Only the first panic is reported.
    ///
    /// `detail` carries the panic payload when it was a string and is not
    /// stable for machine parsing.
    WorkerPanicked { worker: usize, detail: String },
}

impl RunError {
    /// Builds a `WorkerPanicked` from a captured panic payload.
    pub(crate) fn worker_panicked(
        worker: usize,
        payload: Box<dyn std::any::Any + Send + 'static>,
    ) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::WorkerPanicked { worker, detail }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerPanicked { worker, detail } => {
                write!(f, "worker {worker} panicked: {detail}")
            }
        }
    }
}

impl std::error::Error for RunError {}
