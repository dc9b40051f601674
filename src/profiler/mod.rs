//! Per-operation latency and throughput profiling.
//!
//! Every named operation (`"gate:fca_uk/fair_clear_not_misleading"`,
//! `"engine:validate"`, `"cache:get"`, ...) is measured by acquiring a
//! [`Measurement`] guard for the region and letting it drop — recording
//! happens on every exit path, including a panic unwind, because `Drop`
//! always runs. Percentiles are computed over a bounded trailing window
//! per operation so memory stays flat regardless of request volume;
//! count/min/max/mean are exact over the operation's whole lifetime.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use parking_lot::Mutex;

/// Number of most-recent latency samples kept per operation for
/// percentile estimation.
const WINDOW: usize = 1_000;

struct OperationStats {
    count: u64,
    total_us: u64,
    min_us: u64,
    max_us: u64,
    samples: VecDeque<u64>,
    bytes_in: u64,
    bytes_out: u64,
    peak_memory_delta: i64,
}

impl OperationStats {
    fn new() -> Self {
        Self {
            count: 0,
            total_us: 0,
            min_us: u64::MAX,
            max_us: 0,
            samples: VecDeque::with_capacity(WINDOW.min(64)),
            bytes_in: 0,
            bytes_out: 0,
            peak_memory_delta: 0,
        }
    }

    fn record(&mut self, latency_us: u64, bytes_in: u64, bytes_out: u64, memory_delta: i64) {
        self.count += 1;
        self.total_us += latency_us;
        self.min_us = self.min_us.min(latency_us);
        self.max_us = self.max_us.max(latency_us);
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
        if memory_delta > self.peak_memory_delta {
            self.peak_memory_delta = memory_delta;
        }
        if self.samples.len() >= WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(latency_us);
    }

    fn percentile(&self, p: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();
        let rank = ((sorted.len() as f64 - 1.0) * p).round() as usize;
        sorted[rank.min(sorted.len() - 1)]
    }
}

/// Snapshot of one operation's accumulated statistics, in milliseconds
/// except where noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationReport {
    /// Number of measurements recorded.
    pub count: u64,
    /// Minimum latency observed, in milliseconds.
    pub min_ms: f64,
    /// Maximum latency observed, in milliseconds.
    pub max_ms: f64,
    /// Mean latency across every recorded measurement, in milliseconds.
    pub mean_ms: f64,
    /// 50th percentile latency over the trailing sample window, in milliseconds.
    pub p50_ms: f64,
    /// 95th percentile latency over the trailing sample window, in milliseconds.
    pub p95_ms: f64,
    /// 99th percentile latency over the trailing sample window, in milliseconds.
    pub p99_ms: f64,
    /// Total bytes consumed across every measurement of this operation.
    pub total_bytes_in: u64,
    /// Total bytes produced across every measurement of this operation.
    pub total_bytes_out: u64,
    /// Largest positive memory delta observed for this operation, in bytes.
    pub peak_memory_delta: i64,
}

fn us_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

/// Thread-safe registry of per-operation statistics.
pub struct Profiler {
    ops: Mutex<BTreeMap<String, OperationStats>>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Builds an empty profiler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ops: Mutex::new(BTreeMap::new()),
        }
    }

    /// Acquires a scoped measurement for `operation`. Recording happens
    /// when the returned guard drops, regardless of how the caller's
    /// scope exits.
    #[must_use]
    pub fn measure<'a>(&'a self, operation: impl Into<String>) -> Measurement<'a> {
        Measurement {
            profiler: self,
            name: operation.into(),
            started: Instant::now(),
            bytes_in: 0,
            bytes_out: 0,
            memory_delta: 0,
        }
    }

    fn record(&self, name: &str, latency_us: u64, bytes_in: u64, bytes_out: u64, memory_delta: i64) {
        let mut ops = self.ops.lock();
        ops.entry(name.to_string())
            .or_insert_with(OperationStats::new)
            .record(latency_us, bytes_in, bytes_out, memory_delta);
    }

    /// Snapshot of every operation measured so far, keyed by operation name.
    #[must_use]
    pub fn report(&self) -> BTreeMap<String, OperationReport> {
        let ops = self.ops.lock();
        ops.iter()
            .map(|(name, stats)| {
                let mean_us = if stats.count == 0 { 0.0 } else { stats.total_us as f64 / stats.count as f64 };
                (
                    name.clone(),
                    OperationReport {
                        count: stats.count,
                        min_ms: us_to_ms(if stats.min_us == u64::MAX { 0 } else { stats.min_us }),
                        max_ms: us_to_ms(stats.max_us),
                        mean_ms: mean_us / 1000.0,
                        p50_ms: us_to_ms(stats.percentile(0.50)),
                        p95_ms: us_to_ms(stats.percentile(0.95)),
                        p99_ms: us_to_ms(stats.percentile(0.99)),
                        total_bytes_in: stats.bytes_in,
                        total_bytes_out: stats.bytes_out,
                        peak_memory_delta: stats.peak_memory_delta,
                    },
                )
            })
            .collect()
    }

    /// Names of operations whose mean latency exceeds `threshold_ms`.
    #[must_use]
    pub fn bottlenecks(&self, threshold_ms: f64) -> Vec<String> {
        self.report()
            .into_iter()
            .filter(|(_, r)| r.mean_ms > threshold_ms)
            .map(|(name, _)| name)
            .collect()
    }
}

/// A scoped measurement acquired from [`Profiler::measure`]. Records its
/// elapsed time and any byte counters set via [`Measurement::set_bytes_in`]
/// / [`Measurement::set_bytes_out`] when dropped.
pub struct Measurement<'a> {
    profiler: &'a Profiler,
    name: String,
    started: Instant,
    bytes_in: u64,
    bytes_out: u64,
    memory_delta: i64,
}

impl Measurement<'_> {
    /// Records the number of input bytes processed by this measurement's region.
    pub fn set_bytes_in(&mut self, bytes: u64) {
        self.bytes_in = bytes;
    }

    /// Records the number of output bytes produced by this measurement's region.
    pub fn set_bytes_out(&mut self, bytes: u64) {
        self.bytes_out = bytes;
    }

    /// Records an observed memory delta, in bytes, for this measurement's region.
    pub fn set_memory_delta(&mut self, delta: i64) {
        self.memory_delta = delta;
    }
}

impl Drop for Measurement<'_> {
    fn drop(&mut self) {
        let elapsed_us = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.profiler.record(&self.name, elapsed_us, self.bytes_in, self.bytes_out, self.memory_delta);
    }
}
