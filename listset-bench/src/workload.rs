//! Thread-per-class workload driver.
//!
//! ```text
//!  thread ratio i/n:  0 ─────── add_limit ─────── add+remove ─────── 1
//!                     │   add    │     remove       │    contains    │
//! ```
//!
//! Each thread times its own loop; the report sums those durations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::utils::CachePadded;
use listset_core::{ConcurrentSet, SetKind};
use listset_crossbeam::EpochGuard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::report::{BenchReport, ClassCounts};

/// The single operation class a worker thread runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Contains,
}

/// Split of threads between the three operation classes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OperationMix {
    pub add_limit: f64,
    pub remove_limit: f64,
}

impl OperationMix {
    /// Add and remove share whatever `contains` leaves over.
    pub fn from_contains_percent(contains_percent: f64) -> Self {
        let contains = contains_percent / 100.0;
        let add_limit = (1.0 - contains) / 2.0;

        OperationMix {
            add_limit,
            remove_limit: add_limit,
        }
    }

    /// Class of thread `index` out of `threads`.
    pub fn operation_for(&self, index: usize, threads: usize) -> Operation {
        let ratio = index as f64 / threads as f64;

        if ratio < self.add_limit {
            Operation::Add
        } else if ratio < self.add_limit + self.remove_limit {
            Operation::Remove
        } else {
            Operation::Contains
        }
    }

    pub fn class_counts(&self, threads: usize) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for index in 0..threads {
            match self.operation_for(index, threads) {
                Operation::Add => counts.add += 1,
                Operation::Remove => counts.remove += 1,
                Operation::Contains => counts.contains += 1,
            }
        }
        counts
    }
}

/// Validate `config`, build the set it names and run the workload.
pub fn run(config: &BenchConfig) -> Result<BenchReport, BenchError> {
    let kind = config.validate()?;
    let set: Arc<dyn ConcurrentSet<i64>> = Arc::from(kind.build::<i64, EpochGuard>());
    run_on(config, kind, set)
}

/// Run the workload described by `config` against `set`.
///
/// `config` must already be validated.
pub fn run_on(
    config: &BenchConfig,
    kind: SetKind,
    set: Arc<dyn ConcurrentSet<i64>>,
) -> Result<BenchReport, BenchError> {
    let threads = config.threads;
    let mix = OperationMix::from_contains_percent(config.contains_percent);

    // One padded slot per thread so contains results don't false-share
    let contains_results: Arc<Vec<CachePadded<AtomicBool>>> = Arc::new(
        (0..threads)
            .map(|_| CachePadded::new(AtomicBool::new(false)))
            .collect(),
    );
    let barrier = Arc::new(Barrier::new(threads));

    tracing::debug!(%kind, threads, ?mix, iterations = config.iterations, "starting workers");

    let handles: Vec<_> = (0..threads)
        .map(|index| {
            let set = Arc::clone(&set);
            let contains_results = Arc::clone(&contains_results);
            let barrier = Arc::clone(&barrier);
            let operation = mix.operation_for(index, threads);
            let iterations = config.iterations;
            let key_range = config.key_range;
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_entropy(),
            };

            thread::spawn(move || {
                barrier.wait();
                let start = Instant::now();

                for _ in 0..iterations {
                    let key = rng.gen_range(0..key_range);
                    match operation {
                        Operation::Add => {
                            set.add(&key);
                        }
                        Operation::Remove => {
                            set.remove(&key);
                        }
                        Operation::Contains => {
                            contains_results[index].store(set.contains(&key), Ordering::Relaxed);
                        }
                    }
                }

                start.elapsed()
            })
        })
        .collect();

    // Join every worker before reporting, so none is left detached
    let mut total = Duration::ZERO;
    let mut first_panic = None;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(elapsed) => total += elapsed,
            Err(_) => {
                first_panic.get_or_insert(index);
            }
        }
    }

    if let Some(index) = first_panic {
        return Err(BenchError::WorkerPanicked(index));
    }

    Ok(BenchReport {
        kind,
        threads,
        classes: mix.class_counts(threads),
        total_nanos: total.as_nanos(),
        total_operations: config.total_operations()?,
    })
}
