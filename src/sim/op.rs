//! Trace operations and per-operation result records.
//!
//! A trace is an ordered sequence of [`Operation`] values. Replaying a trace
//! produces one [`OperationRecord`] per operation, in trace order, so record
//! indices always line up with the input.

use serde::{Deserialize, Serialize};

/// Cache key. The source traces use plain integers.
pub type Key = i64;

/// Cached value.
pub type Value = i64;

/// A single trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Look up `key`; hits and misses feed the run metrics.
    Get(Key),
    /// Insert or update `key` with `value`, evicting on overflow.
    Put(Key, Value),
    /// CPU work interleaved with cache traffic. Never touches the cache,
    /// but still occupies one slot in the record sequence.
    Compute,
}

impl Operation {
    /// The kind of this operation, without its arguments.
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Get(_) => OpKind::Get,
            Operation::Put(_, _) => OpKind::Put,
            Operation::Compute => OpKind::Compute,
        }
    }
}

/// Operation kind, used in records and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Get,
    Put,
    Compute,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Get => write!(f, "get"),
            OpKind::Put => write!(f, "put"),
            OpKind::Compute => write!(f, "compute"),
        }
    }
}

/// Outcome of one replayed operation.
///
/// `Get` yields a hit or a miss; `Put` and `Compute` have no lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpOutcome {
    /// `Get` found the key; carries the stored value.
    Hit(Value),
    /// `Get` did not find the key.
    Miss,
    /// `Put` and `Compute` rows.
    NotApplicable,
}

// Rendered exactly as the result column of the output rows:
// the value on a hit, `-1` on a miss, `N/A` otherwise.
impl std::fmt::Display for OpOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpOutcome::Hit(value) => write!(f, "{value}"),
            OpOutcome::Miss => write!(f, "-1"),
            OpOutcome::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// One row of replay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Zero-based position in the trace. Rendered one-based in reports.
    pub index: usize,

    /// What kind of operation produced this record.
    pub kind: OpKind,

    /// Number of entries in the cache after the operation.
    pub cache_size: usize,

    /// Lookup outcome for `Get`, `NotApplicable` otherwise.
    pub outcome: OpOutcome,
}
