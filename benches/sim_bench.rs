//! Benchmarks for the eviction engine and trace replay.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use evict_sim::sim::cache::{EvictionCache, Policy};
use evict_sim::sim::op::Operation;
use evict_sim::sim::runner::Replay;

fn bench_eviction_churn(c: &mut Criterion) {
    // Every insert past capacity forces a full min-scan over 256 entries.
    c.bench_function("eviction_churn_10k_inserts_cap256", |b| {
        b.iter(|| {
            let mut cache = EvictionCache::new(Policy::LfuDecay, 256, 0.5).unwrap();
            for i in 0..10_000i64 {
                cache.put(black_box(i), i);
            }
            black_box(cache.len());
        })
    });
}

fn bench_replay_mixed_trace(c: &mut Criterion) {
    let ops: Vec<Operation> = (0..10_000i64)
        .map(|i| match i % 3 {
            0 => Operation::Put(i % 512, i),
            1 => Operation::Get(i % 384),
            _ => Operation::Compute,
        })
        .collect();

    c.bench_function("replay_10k_mixed_ops", |b| {
        b.iter(|| {
            let cache = EvictionCache::new(Policy::LruDecay, 256, 0.5).unwrap();
            let (records, metrics) = Replay::new(cache, black_box(&ops)).run_to_end();
            black_box((records.len(), metrics));
        })
    });
}

fn bench_decay_update_heavy(c: &mut Criterion) {
    // Updates of existing keys decay every other entry, the O(n) hot path.
    let ops: Vec<Operation> = (0..10_000i64).map(|i| Operation::Put(i % 128, i)).collect();

    c.bench_function("decay_10k_updates_cap128", |b| {
        b.iter(|| {
            let cache = EvictionCache::new(Policy::FifoDecay, 128, 0.9).unwrap();
            let (records, _) = Replay::new(cache, black_box(&ops)).run_to_end();
            black_box(records.len());
        })
    });
}

criterion_group!(
    benches,
    bench_eviction_churn,
    bench_replay_mixed_trace,
    bench_decay_update_heavy,
);
criterion_main!(benches);
