//! Core simulation engine.
//!
//! - [`op`]: trace operations and per-operation records
//! - [`cache`]: the eviction-policy engine (three adaptive variants)
//! - [`runner`]: lazy replay of one trace against one cache
//! - [`harness`]: multi-policy runs, sequential or concurrent, with
//!   aggregated metrics

pub mod cache;
pub mod harness;
pub mod op;
pub mod runner;
