use listset_core::SetError;
use thiserror::Error;

/// Errors raised by the benchmark harness.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The set could not be selected.
    #[error(transparent)]
    Set(#[from] SetError),

    /// A worker thread panicked before reporting its time.
    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),
}
