//! Benchmark comparing the five set variants on the thread-per-class
//! workload used by the `listset-bench` binary.
//!
//! Run with: cargo bench --package listset-bench --bench set_benchmark

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use listset_bench::{BenchConfig, run};
use listset_core::{ConcurrentSet, SetKind};
use listset_crossbeam::EpochGuard;
use mimalloc::MiMalloc;
use std::sync::Arc;
use std::thread;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const OPS_PER_THREAD: usize = 10_000;
const KEY_RANGE: i64 = 100;

fn workload(kind: SetKind, threads: usize, contains_percent: f64) {
    let mut config = BenchConfig::new(kind, threads, contains_percent);
    config.iterations = OPS_PER_THREAD;
    config.seed = Some(42);

    if let Err(e) = run(black_box(&config)) {
        panic!("benchmark workload failed: {e}");
    }
}

/// Every thread adds then removes its own keys: no logical conflicts, so the
/// cost is pure synchronization overhead.
fn disjoint_churn(kind: SetKind, threads: usize) {
    let set: Arc<dyn ConcurrentSet<i64>> = Arc::from(kind.build::<i64, EpochGuard>());
    let mut handles = vec![];

    for t in 0..threads {
        let set = Arc::clone(&set);
        handles.push(thread::spawn(move || {
            let base = (t * OPS_PER_THREAD) as i64;
            for i in 0..OPS_PER_THREAD as i64 {
                set.add(&(base + i % KEY_RANGE));
                set.remove(&(base + i % KEY_RANGE));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Criterion benchmark groups
// ============================================================================

fn mix_benchmark(c: &mut Criterion, contains_percent: f64) {
    let mut group = c.benchmark_group(format!("workload_contains_{contains_percent}"));
    group.sample_size(20);

    for threads in [1, 2, 4, 8] {
        for kind in SetKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.name(), threads),
                &threads,
                |b, &threads| b.iter(|| workload(kind, black_box(threads), contains_percent)),
            );
        }
    }

    group.finish();
}

fn write_heavy_benchmark(c: &mut Criterion) {
    mix_benchmark(c, 0.0);
}

fn balanced_benchmark(c: &mut Criterion) {
    mix_benchmark(c, 50.0);
}

fn read_heavy_benchmark(c: &mut Criterion) {
    mix_benchmark(c, 90.0);
}

fn disjoint_churn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("disjoint_churn");
    group.sample_size(20);

    for threads in [1, 2, 4, 8] {
        for kind in SetKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.name(), threads),
                &threads,
                |b, &threads| b.iter(|| disjoint_churn(kind, black_box(threads))),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    write_heavy_benchmark,
    balanced_benchmark,
    read_heavy_benchmark,
    disjoint_churn_benchmark,
);
criterion_main!(benches);
