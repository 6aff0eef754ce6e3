//! Miner configuration.
//!
//! All knobs are validated up front; invalid values fail construction
//! instead of being clamped.

use crate::error::ConfigError;

/// Configuration for a mining run.
#[derive(Clone, Copy, Debug)]
pub struct MinerConfig {
    /// Number of worker threads.
    pub workers: usize,

    /// Result list length per item (the K of top-K).
    ///
    /// Expected to be small (tens); per-item insertion is O(K).
    pub k: usize,

    /// Emit each distinct pattern at most once at drain time.
    ///
    /// Without this flag a pattern surviving in several items' lists is
    /// emitted once per list.
    pub unique_output: bool,
}

impl MinerConfig {
    /// Configuration with `workers` threads and result lists of length `k`.
    pub fn new(workers: usize, k: usize) -> Self {
        Self {
            workers,
            k,
            unique_output: false,
        }
    }

    /// Emit each distinct pattern at most once.
    pub fn with_unique_output(mut self) -> Self {
        self.unique_output = true;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero worker count or zero K.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers { got: self.workers });
        }
        if self.k == 0 {
            return Err(ConfigError::InvalidK { got: self.k });
        }
        Ok(())
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers,
            k: 10,
            unique_output: false,
        }
    }
}
