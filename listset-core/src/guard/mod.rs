//! Guard trait for memory reclamation strategies.
//!
//! The optimistic, lazy and lock-free sets walk the list without holding any
//! lock, so a node unlinked by one thread may still be under another thread's
//! cursor. Such nodes are *retired* through a guard instead of being freed
//! in place.
//!
//! ```text
//! LockFreeSet<T, G: Guard>
//!     │
//!     ├── LockFreeSet<T, EpochGuard>      (production, listset-crossbeam)
//!     └── LockFreeSet<T, DeferredGuard>   (testing)
//! ```
//!
//! The coarse and fine-grained sets never need a guard: a node is only
//! unlinked while every thread that could reach it is locked out.

mod deferred_guard;

pub use deferred_guard::DeferredGuard;

/// A memory reclamation guard that protects concurrent access to nodes.
///
/// # Safety Contract
///
/// Implementations must ensure:
/// 1. Nodes passed to `defer_destroy` are not freed while any thread that
///    pinned before the call still holds its `ReadGuard`
/// 2. Every node passed to `defer_destroy` is eventually freed exactly once
///
/// # Design Note
///
/// Guards are stored in sets and must be `Send + Sync`. The stored guard is
/// used for scheduling destruction; thread pinning happens per operation.
///
pub trait Guard: Sized + Default + Send + Sync {
    /// An active guard that protects node reads for its lifetime.
    ///
    /// For epoch-based guards this holds a pinned `crossbeam_epoch::Guard`.
    /// For deferred guards it is `()`: the stored guard outlives every read.
    ///
    type ReadGuard: Sized;

    /// Pin the current thread for the duration of one operation.
    fn pin() -> Self::ReadGuard;

    /// Schedule a node for deferred destruction.
    ///
    /// # Safety
    ///
    /// - `node` must be a valid pointer previously allocated by the set
    /// - `node` must be unlinked (not reachable by a traversal from HEAD)
    /// - `node` must not be retired twice
    /// - `dealloc` must be the correct deallocation function for `node`
    ///
    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N));
}
