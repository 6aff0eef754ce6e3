//! Pattern output sinks.
//!
//! # Design
//!
//! Workers never format while holding a sink lock: each `collect` call
//! formats the record into a local buffer first, then takes the lock only
//! for the actual write. Record ordering between concurrent collectors is
//! non-deterministic; records never interleave at the byte level.
//!
//! # Panic policy
//!
//! Writer sinks panic on I/O errors (fail-fast), except `BrokenPipe` on
//! stdout which is silently ignored (standard behavior for `miner | head`).
//!
//! # Record format
//!
//! One line per pattern: `support<TAB>item item item...`.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Default buffer size for writer sinks (64 KiB).
///
/// Fewer, larger writes keep lock hold times short when several workers
/// drain through the same sink.
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

// ============================================================================
// Trait
// ============================================================================

/// Output contract for mined patterns.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; `collect` may be called from any
/// number of threads. The statistics accessors are meaningful once no
/// collector is running (normally after `close`).
pub trait PatternSink: Send + Sync + 'static {
    /// Records one pattern with its support.
    fn collect(&self, support: u32, pattern: &[u32]);

    /// Flushes buffered output and returns the number of patterns
    /// collected.
    fn close(&self) -> u64;

    /// Number of patterns collected so far.
    fn collected(&self) -> u64;

    /// Total number of items across all collected patterns.
    fn collected_length(&self) -> u64;

    /// Mean pattern length, rounded down; 0 before anything is collected.
    fn average_pattern_length(&self) -> u32 {
        let collected = self.collected();
        if collected == 0 {
            0
        } else {
            (self.collected_length() / collected) as u32
        }
    }
}

/// Running output statistics shared by the sink implementations.
#[derive(Debug, Default)]
struct SinkStats {
    collected: AtomicU64,
    length: AtomicU64,
}

impl SinkStats {
    fn record(&self, pattern_len: usize) {
        self.collected.fetch_add(1, Ordering::Relaxed);
        self.length.fetch_add(pattern_len as u64, Ordering::Relaxed);
    }

    fn collected(&self) -> u64 {
        self.collected.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }
}

/// Formats one record into `buf`: `support<TAB>items...\n`.
fn format_record(buf: &mut Vec<u8>, support: u32, pattern: &[u32]) {
    buf.clear();
    buf.extend_from_slice(support.to_string().as_bytes());
    buf.push(b'\t');
    for (i, item) in pattern.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        buf.extend_from_slice(item.to_string().as_bytes());
    }
    buf.push(b'\n');
}

// ============================================================================
// StdoutPatternSink
// ============================================================================

/// Buffered stdout sink.
///
/// `BrokenPipe` is silently ignored so piping into `head` behaves.
pub struct StdoutPatternSink {
    out: Mutex<BufWriter<io::Stdout>>,
    stats: SinkStats,
}

impl StdoutPatternSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUF_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(cap, io::stdout())),
            stats: SinkStats::default(),
        }
    }
}

impl Default for StdoutPatternSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSink for StdoutPatternSink {
    fn collect(&self, support: u32, pattern: &[u32]) {
        let mut buf = Vec::with_capacity(16 + pattern.len() * 8);
        format_record(&mut buf, support, pattern);
        self.stats.record(pattern.len());

        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.write_all(&buf) {
            if e.kind() == ErrorKind::BrokenPipe {
                return;
            }
            panic!("stdout write failed: {e}");
        }
    }

    fn close(&self) -> u64 {
        let mut out = self.out.lock().expect("stdout sink mutex poisoned");
        if let Err(e) = out.flush() {
            if e.kind() != ErrorKind::BrokenPipe {
                panic!("stdout flush failed: {e}");
            }
        }
        self.stats.collected()
    }

    fn collected(&self) -> u64 {
        self.stats.collected()
    }

    fn collected_length(&self) -> u64 {
        self.stats.length()
    }
}

// ============================================================================
// FilePatternSink
// ============================================================================

/// Buffered file sink. Creates/truncates the target file.
pub struct FilePatternSink {
    out: Mutex<BufWriter<std::fs::File>>,
    stats: SinkStats,
}

impl FilePatternSink {
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            out: Mutex::new(BufWriter::with_capacity(DEFAULT_BUF_CAPACITY, file)),
            stats: SinkStats::default(),
        })
    }
}

impl PatternSink for FilePatternSink {
    fn collect(&self, support: u32, pattern: &[u32]) {
        let mut buf = Vec::with_capacity(16 + pattern.len() * 8);
        format_record(&mut buf, support, pattern);
        self.stats.record(pattern.len());

        let mut out = self.out.lock().expect("file sink mutex poisoned");
        out.write_all(&buf).expect("pattern file write failed");
    }

    fn close(&self) -> u64 {
        self.out
            .lock()
            .expect("file sink mutex poisoned")
            .flush()
            .expect("pattern file flush failed");
        self.stats.collected()
    }

    fn collected(&self) -> u64 {
        self.stats.collected()
    }

    fn collected_length(&self) -> u64 {
        self.stats.length()
    }
}

// ============================================================================
// VecPatternSink (for testing)
// ============================================================================

/// Test sink: captures `(support, pattern)` records in memory.
#[derive(Default)]
pub struct VecPatternSink {
    records: Mutex<Vec<(u32, Vec<u32>)>>,
    stats: SinkStats,
}

impl VecPatternSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the captured records, leaving the sink empty.
    pub fn take(&self) -> Vec<(u32, Vec<u32>)> {
        let mut g = self.records.lock().expect("vec sink mutex poisoned");
        std::mem::take(&mut *g)
    }
}

impl PatternSink for VecPatternSink {
    fn collect(&self, support: u32, pattern: &[u32]) {
        self.stats.record(pattern.len());
        self.records
            .lock()
            .expect("vec sink mutex poisoned")
            .push((support, pattern.to_vec()));
    }

    fn close(&self) -> u64 {
        self.stats.collected()
    }

    fn collected(&self) -> u64 {
        self.stats.collected()
    }

    fn collected_length(&self) -> u64 {
        self.stats.length()
    }
}

// ============================================================================
// NullPatternSink (for benchmarking)
// ============================================================================

/// Discards patterns while still counting them.
///
/// Use to measure scheduler and index overhead without output costs.
#[derive(Default)]
pub struct NullPatternSink {
    stats: SinkStats,
}

impl NullPatternSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternSink for NullPatternSink {
    fn collect(&self, _support: u32, pattern: &[u32]) {
        self.stats.record(pattern.len());
    }

    fn close(&self) -> u64 {
        self.stats.collected()
    }

    fn collected(&self) -> u64 {
        self.stats.collected()
    }

    fn collected_length(&self) -> u64 {
        self.stats.length()
    }
}

// ============================================================================
// Tests
// ============================================================================
