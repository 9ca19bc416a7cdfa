//! Deferred guard implementation for testing.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use super::Guard;

/// A guard that keeps every retired node until the guard itself is dropped.
///
/// Destruction timing is fully predictable, which makes it the guard of
/// choice for tests. Memory grows with the number of removals, so it is not
/// meant for long-running use.
///
/// In debug builds, retiring the same node twice panics immediately.
///
pub struct DeferredGuard {
    retired: Mutex<Vec<RetiredNode>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct RetiredNode {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: the node is unlinked and owned by the guard from now on; the Mutex
// serializes access to the list.
unsafe impl Send for RetiredNode {}

impl DeferredGuard {
    pub fn new() -> Self {
        DeferredGuard {
            retired: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of nodes retired so far and not yet freed.
    pub fn retired_count(&self) -> usize {
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        let nodes = self
            .retired
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if !nodes.is_empty() {
            tracing::debug!(nodes = nodes.len(), "freeing retired nodes");
        }

        for node in nodes.drain(..) {
            unsafe {
                (node.dealloc)(node.ptr);
            }
        }
    }
}

impl Guard for DeferredGuard {
    /// Protection comes from the set's stored guard, so pinning is a no-op.
    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        // Keyed by address: every zero-sized allocation shares one address,
        // so nodes must not be zero-sized.
        #[cfg(debug_assertions)]
        {
            let addr = node as usize;
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            if !seen.insert(addr) {
                panic!("node {:#x} retired twice", addr);
            }
        }

        let node = RetiredNode {
            ptr: node as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        };
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(node);
    }
}
