use clap::Parser;
use listset_core::SetKind;

use crate::error::BenchError;

pub const DEFAULT_ITERATIONS: usize = 10_000;
pub const DEFAULT_KEY_RANGE: i64 = 100;

/// Throughput benchmark for the concurrent list-based sets.
///
/// Every thread runs one operation class (add, remove or contains) on
/// uniformly random keys against a single shared set.
#[derive(Parser, Debug, Clone)]
#[command(name = "listset-bench")]
#[command(about = "Throughput benchmark for concurrent list-based sets")]
pub struct BenchConfig {
    /// Set variant: coarse, fine, optimistic, lazy or lock-free.
    ///
    /// Class names such as `LockFreeSet` are accepted too.
    pub kind: String,

    /// Number of worker threads.
    pub threads: usize,

    /// Share of threads running `contains`, in percent (0-100).
    ///
    /// The remaining threads are split evenly between add and remove.
    pub contains_percent: f64,

    /// Operations per thread.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Keys are drawn uniformly from `0..key_range`.
    #[arg(long, default_value_t = DEFAULT_KEY_RANGE)]
    pub key_range: i64,

    /// Seed for the per-thread key generators (random if not set).
    #[arg(long)]
    pub seed: Option<u64>,
}

impl BenchConfig {
    pub fn new(kind: SetKind, threads: usize, contains_percent: f64) -> Self {
        BenchConfig {
            kind: kind.name().to_string(),
            threads,
            contains_percent,
            iterations: DEFAULT_ITERATIONS,
            key_range: DEFAULT_KEY_RANGE,
            seed: None,
        }
    }

    /// Check every parameter and resolve the set kind.
    pub fn validate(&self) -> Result<SetKind, BenchError> {
        let kind = self.kind.parse::<SetKind>()?;

        if self.threads == 0 {
            return Err(BenchError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.contains_percent) {
            return Err(BenchError::InvalidConfig(format!(
                "contains percentage must be between 0 and 100, got {}",
                self.contains_percent
            )));
        }
        if self.iterations == 0 {
            return Err(BenchError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        self.total_operations()?;

        if self.key_range < 1 {
            return Err(BenchError::InvalidConfig(format!(
                "key range must be at least 1, got {}",
                self.key_range
            )));
        }

        Ok(kind)
    }

    /// `threads × iterations`, rejected if it doesn't fit in a `u64`.
    pub fn total_operations(&self) -> Result<u64, BenchError> {
        self.threads
            .checked_mul(self.iterations)
            .and_then(|total| u64::try_from(total).ok())
            .ok_or_else(|| {
                BenchError::InvalidConfig(format!(
                    "{} threads × {} iterations overflows the operation count",
                    self.threads, self.iterations
                ))
            })
    }
}
