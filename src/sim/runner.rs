//! Trace replay against a single cache instance.
//!
//! [`Replay`] walks an operation sequence lazily, mutating the cache it owns
//! and yielding one [`OperationRecord`] per operation. Hit/miss counters
//! accumulate as records are drained; [`RunMetrics`] snapshots them.

use serde::{Deserialize, Serialize};

use crate::sim::cache::EvictionCache;
use crate::sim::op::{OpOutcome, Operation, OperationRecord};

/// Hit/miss counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// `Get` operations that found their key.
    pub hits: u64,

    /// `Get` operations that did not.
    pub misses: u64,

    /// Total operations replayed, of any kind. The rate denominator.
    pub total_operations: u64,
}

impl RunMetrics {
    /// Hits as a fraction of all operations. `0.0` for an empty run.
    pub fn hit_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_operations as f64
    }

    /// Misses as a fraction of all operations. `0.0` for an empty run.
    pub fn miss_rate(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }
        self.misses as f64 / self.total_operations as f64
    }

    /// Fold another run's counters into this one.
    pub fn absorb(&mut self, other: &RunMetrics) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.total_operations += other.total_operations;
    }
}

/// Lazy replay of one trace against one exclusively-owned cache.
///
/// Non-restartable: each operation is consumed exactly once, in trace
/// order. Dropping the iterator early leaves the counters at whatever the
/// drained prefix produced.
pub struct Replay<'a> {
    cache: EvictionCache,
    ops: std::iter::Enumerate<std::slice::Iter<'a, Operation>>,
    metrics: RunMetrics,
}

impl<'a> Replay<'a> {
    /// Start a replay of `ops` against `cache`, taking ownership of the
    /// cache for the lifetime of the run.
    pub fn new(cache: EvictionCache, ops: &'a [Operation]) -> Self {
        Self {
            cache,
            ops: ops.iter().enumerate(),
            metrics: RunMetrics::default(),
        }
    }

    /// Counters for the operations drained so far.
    pub fn metrics(&self) -> RunMetrics {
        self.metrics
    }

    /// Current cache occupancy.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drain the remaining operations, collecting every record.
    pub fn run_to_end(mut self) -> (Vec<OperationRecord>, RunMetrics) {
        let mut records = Vec::with_capacity(self.ops.len());
        for record in &mut self {
            records.push(record);
        }
        (records, self.metrics)
    }
}

impl Iterator for Replay<'_> {
    type Item = OperationRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, op) = self.ops.next()?;
        self.metrics.total_operations += 1;

        let outcome = match *op {
            Operation::Get(key) => match self.cache.get(key) {
                Some(value) => {
                    self.metrics.hits += 1;
                    OpOutcome::Hit(value)
                }
                None => {
                    self.metrics.misses += 1;
                    OpOutcome::Miss
                }
            },
            Operation::Put(key, value) => {
                self.cache.put(key, value);
                OpOutcome::NotApplicable
            }
            Operation::Compute => OpOutcome::NotApplicable,
        };

        Some(OperationRecord {
            index,
            kind: op.kind(),
            cache_size: self.cache.len(),
            outcome,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ops.size_hint()
    }
}
