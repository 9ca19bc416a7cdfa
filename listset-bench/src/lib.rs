//! Benchmark harness for the listset variants.
//!
//! The binary parses a [`BenchConfig`] from the command line and prints a
//! [`BenchReport`]; the same pieces drive the criterion benchmarks.

pub mod config;
pub mod error;
pub mod report;
pub mod workload;

pub use config::BenchConfig;
pub use error::BenchError;
pub use report::{BenchReport, ClassCounts};
pub use workload::{Operation, OperationMix, run, run_on};
