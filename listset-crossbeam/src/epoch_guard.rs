//! Epoch-based guard implementation using crossbeam-epoch.
//!
//! Sets parameterized with `EpochGuard` pin the calling thread for every
//! operation, and unlinked nodes are freed by the global epoch collector
//! once no pinned thread can still see them:
//!
//! ```text
//! LockFreeSet<T, EpochGuard>
//!     │
//!     ├── add/remove/contains  ──► epoch::pin() for the whole walk
//!     └── retire(node)         ──► defer_unchecked(dealloc(node))
//! ```

use crossbeam_epoch::{self as epoch, Guard as CrossbeamGuard};
use listset_core::guard::Guard;

/// Epoch-based memory reclamation guard.
///
/// Nodes are not freed until all threads have advanced past the epoch in
/// which they were retired.
///
/// Unlike `DeferredGuard`, which stores pending destructions until the set
/// drops, `EpochGuard` is a zero-sized type that schedules destruction with
/// the global epoch collector. Memory is reclaimed while the set is in use,
/// which makes it the guard for long-running workloads.
///
/// When `defer_destroy` is called, it:
/// 1. Pins the current thread to the current epoch
/// 2. Schedules the destruction to run after all threads have advanced
/// 3. Unpins (the destruction is managed globally)
///
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochGuard {
    // Zero-sized - all state is in the global epoch collector
}

impl EpochGuard {
    pub fn new() -> Self {
        EpochGuard {}
    }
}

impl Guard for EpochGuard {
    /// A pinned crossbeam guard: nodes retired after it was taken stay
    /// allocated until it is dropped.
    type ReadGuard = CrossbeamGuard;

    fn pin() -> Self::ReadGuard {
        epoch::pin()
    }

    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        let guard = epoch::pin();
        unsafe {
            guard.defer_unchecked(move || {
                dealloc(node);
            });
        }
    }
}
