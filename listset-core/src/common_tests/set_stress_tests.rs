//! Common stress tests for ConcurrentSet implementations.
//!
//! These tests verify concurrent correctness under high contention.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use crate::data_structures::ConcurrentSet;

/// Operation in a per-thread plan for [`test_key_accounting`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetOp {
    Add,
    Remove,
    Contains,
}

/// Test contains operations during modifications
pub fn test_contains_during_modifications<S>()
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let stop_flag = Arc::new(AtomicBool::new(false));
    let lookups = Arc::new(AtomicUsize::new(0));

    // Pre-populate with even numbers
    for i in 0..500 {
        set.add(&(i * 2));
    }

    let mut handles = vec![];

    // Modifier threads only touch keys the finders don't care about
    for t in 0..4 {
        let set = Arc::clone(&set);
        let stop = Arc::clone(&stop_flag);
        handles.push(thread::spawn(move || {
            let mut i = 0;
            while !stop.load(Ordering::Relaxed) {
                let val = 10_000 + t * 10_000 + (i % 1000);
                if i % 2 == 0 {
                    set.add(&val);
                } else {
                    set.remove(&val);
                }
                i += 1;
            }
        }));
    }

    // Finder threads: the pre-populated keys must stay visible throughout
    for _ in 0..4 {
        let set = Arc::clone(&set);
        let stop = Arc::clone(&stop_flag);
        let lookups = Arc::clone(&lookups);
        handles.push(thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                for i in 0..1000 {
                    assert_eq!(set.contains(&i), i % 2 == 0, "Wrong membership for {}", i);
                    lookups.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    thread::sleep(Duration::from_secs(1));
    stop_flag.store(true, Ordering::Relaxed);

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(lookups.load(Ordering::Relaxed) > 0);
}

/// Test concurrent remove of the same value - exactly one should succeed
pub fn test_concurrent_remove_same_value<S>()
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let num_threads = 100;
    let test_value = 42;

    set.add(&test_value);

    let success_count = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let set = Arc::clone(&set);
            let success = Arc::clone(&success_count);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if set.remove(&test_value) {
                    success.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        success_count.load(Ordering::Relaxed),
        1,
        "Exactly one thread should successfully remove the value"
    );
    assert!(!set.contains(&test_value), "Value should be gone");
}

/// Test linearizability - operations appear to take effect atomically
pub fn test_linearizability<S>()
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let num_threads = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let num_ops = 2000;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for i in 0..num_ops {
                    let key = (t * num_ops + i) as i64;

                    // Add must return true for new key
                    assert!(set.add(&key), "Failed to add unique key {}", key);

                    // Immediately after add, must be found
                    assert!(set.contains(&key), "Key {} not found after add", key);

                    // Remove must succeed for existing key
                    assert!(set.remove(&key), "Failed to remove existing key {}", key);

                    // After remove, must not be found
                    assert!(!set.contains(&key), "Key {} found after remove", key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(set.is_empty());
}

/// Replay per-thread plans concurrently and check the final state per key.
///
/// For every key in `0..key_range`, successful adds minus successful removes
/// across all threads must be 0 or 1 and must match final membership.
pub fn test_key_accounting<S>(plans: Vec<Vec<(SetOp, i64)>>, key_range: i64)
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let barrier = Arc::new(Barrier::new(plans.len()));
    let range = key_range as usize;

    let handles: Vec<_> = plans
        .into_iter()
        .map(|plan| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                // net[k] = successful adds - successful removes of k
                let mut net = vec![0i64; range];
                barrier.wait();

                for (op, key) in plan {
                    match op {
                        SetOp::Add => {
                            if set.add(&key) {
                                net[key as usize] += 1;
                            }
                        }
                        SetOp::Remove => {
                            if set.remove(&key) {
                                net[key as usize] -= 1;
                            }
                        }
                        SetOp::Contains => {
                            set.contains(&key);
                        }
                    }
                }
                net
            })
        })
        .collect();

    let mut net = vec![0i64; range];
    for handle in handles {
        for (total, local) in net.iter_mut().zip(handle.join().unwrap()) {
            *total += local;
        }
    }

    for key in 0..key_range {
        let balance = net[key as usize];
        assert!(
            balance == 0 || balance == 1,
            "Key {} has add/remove balance {}",
            key,
            balance
        );
        assert_eq!(
            set.contains(&key),
            balance == 1,
            "Key {} membership disagrees with its balance",
            key
        );
    }

    let members = net.iter().filter(|b| **b == 1).count();
    assert_eq!(set.len(), members);
}

/// Test that at least one thread always makes progress
pub fn test_progress_guarantee<S>()
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let num_threads = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    let progress_counters: Vec<_> = (0..num_threads)
        .map(|_| Arc::new(AtomicUsize::new(0)))
        .collect();

    let stop = Arc::new(AtomicBool::new(false));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let set = Arc::clone(&set);
            let counter = Arc::clone(&progress_counters[t]);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut i = 0i64;
                while !stop.load(Ordering::Relaxed) {
                    let key = (t as i64) * 1_000_000 + (i % 1000);

                    if set.add(&key) {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }

                    if set.remove(&key) {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }

                    i += 1;
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_secs(2));
    stop.store(true, Ordering::Relaxed);

    for handle in handles {
        handle.join().unwrap();
    }

    let max_progress = progress_counters
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .max()
        .unwrap();

    assert!(
        max_progress > 500,
        "No thread made sufficient progress (max: {})",
        max_progress
    );
}

/// Test extreme contention on a single key
pub fn test_extreme_contention_single_key<S>()
where
    S: ConcurrentSet<i64> + Default + Send + Sync + 'static,
{
    let set = Arc::new(S::default());
    let num_threads = 16;
    let iterations = 2000;
    let key = 7;

    let adds = Arc::new(AtomicUsize::new(0));
    let removes = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(num_threads));

    let start = Instant::now();
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let set = Arc::clone(&set);
            let adds = Arc::clone(&adds);
            let removes = Arc::clone(&removes);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..iterations {
                    if t % 2 == 0 {
                        if set.add(&key) {
                            adds.fetch_add(1, Ordering::Relaxed);
                        }
                    } else if set.remove(&key) {
                        removes.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let adds = adds.load(Ordering::Relaxed);
    let removes = removes.load(Ordering::Relaxed);

    // Successful adds and removes must alternate on one key
    assert!(adds == removes || adds == removes + 1, "adds {} removes {}", adds, removes);
    assert_eq!(set.contains(&key), adds == removes + 1);
    assert!(start.elapsed() < Duration::from_secs(60), "Single key contention took too long");
}
