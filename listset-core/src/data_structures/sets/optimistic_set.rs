use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::ptr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::data_structures::internal::chain::{self, item_bound, lock_node};
use crate::data_structures::{
    Bound, ChainNode, ConcurrentSet, DefaultKeyHasher, SetKind, Window,
};
use crate::guard::Guard;

type NodePtr = *mut OptimisticNode;

struct OptimisticNode {
    bound: Bound,
    lock: Mutex<()>,
    // Written under this node's lock, read by unlocked traversals
    next: AtomicPtr<OptimisticNode>,
}

impl OptimisticNode {
    fn new(bound: Bound, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(OptimisticNode {
            bound,
            lock: Mutex::new(()),
            next: AtomicPtr::new(next),
        }))
    }

    /// Load next pointer (Acquire ordering)
    #[inline]
    fn get_next(&self) -> NodePtr {
        self.next.load(Ordering::Acquire)
    }

    /// Store next pointer (Release ordering)
    #[inline]
    fn set_next(&self, next: NodePtr) {
        self.next.store(next, Ordering::Release)
    }
}

impl ChainNode for OptimisticNode {
    fn bound(&self) -> Bound {
        self.bound
    }

    fn successor(&self) -> NodePtr {
        self.get_next()
    }
}

/// Sorted-list set with unlocked search and validated two-node locking.
///
/// Each operation:
///
/// 1. walks the list without locks to find `(pred, curr)`
/// 2. locks `pred`, then `curr`
/// 3. re-walks from HEAD to check that `pred` is still reachable and still
///    points at `curr`
/// 4. decides and mutates, or releases both locks and starts over
///
/// The search (the expensive part) runs without locks; the price is a
/// second walk on every validation. Removed nodes may still be under another
/// thread's unlocked cursor, so they are retired through the guard `G`.
///
pub struct OptimisticSet<T: ?Sized, G: Guard, S = DefaultKeyHasher> {
    head: NodePtr,
    /// Shared guard instance for deferred destruction of removed nodes.
    guard: G,
    hasher: S,
    _phantom: PhantomData<fn(&T)>,
}

// Safety: links are atomics written under node locks, and removed nodes are
// only freed through the guard.
unsafe impl<T: ?Sized, G: Guard, S: Send> Send for OptimisticSet<T, G, S> {}
unsafe impl<T: ?Sized, G: Guard, S: Sync> Sync for OptimisticSet<T, G, S> {}

impl<T, G> OptimisticSet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<T, G, S> OptimisticSet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        let tail = OptimisticNode::new(Bound::PosInf, ptr::null_mut());
        let head = OptimisticNode::new(Bound::NegInf, tail);
        tracing::debug!(kind = %SetKind::Optimistic, "set created");

        OptimisticSet {
            head,
            guard: G::default(),
            hasher,
            _phantom: PhantomData,
        }
    }

    /// Get the shared guard instance for this set.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Check that `pred` is reachable from HEAD and still links to `curr`.
    ///
    /// # Safety
    /// Caller holds the locks of `pred` and `curr` and is pinned.
    unsafe fn validate(&self, window: Window<OptimisticNode>) -> bool {
        unsafe {
            let pred_bound = (*window.pred).bound;
            let mut node = self.head;

            // pred is never TAIL, so the walk stops at TAIL at the latest
            while (*node).bound <= pred_bound {
                if node == window.pred {
                    return (*window.pred).get_next() == window.curr;
                }
                node = (*node).get_next();
            }
        }
        false
    }

    /// Run `decide` on a locked and validated window of `bound`.
    ///
    /// Retries until validation succeeds. The locks are held while `decide`
    /// runs and released before this returns.
    fn with_validated_window<R>(
        &self,
        op: &'static str,
        bound: Bound,
        decide: impl Fn(Window<OptimisticNode>) -> R,
    ) -> R {
        loop {
            unsafe {
                let window = chain::search(self.head, bound);
                let _pred_guard = lock_node(&(*window.pred).lock);
                let _curr_guard = lock_node(&(*window.curr).lock);

                if self.validate(window) {
                    return decide(window);
                }
            }

            tracing::trace!(
                kind = %SetKind::Optimistic,
                op,
                key = ?bound,
                "validation failed, retrying",
            );
        }
    }
}

impl<T, G, S> ConcurrentSet<T> for OptimisticSet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher + Send + Sync,
{
    fn kind(&self) -> SetKind {
        SetKind::Optimistic
    }

    fn add(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        self.with_validated_window("add", bound, |window| unsafe {
            if window.is_match(bound) {
                return false;
            }
            (*window.pred).set_next(OptimisticNode::new(bound, window.curr));
            true
        })
    }

    fn remove(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        let removed = self.with_validated_window("remove", bound, |window| unsafe {
            if !window.is_match(bound) {
                return None;
            }
            (*window.pred).set_next((*window.curr).get_next());
            Some(window.curr)
        });

        match removed {
            Some(node) => {
                // Unreachable from HEAD, but unlocked searches may still be on it
                unsafe {
                    self.guard
                        .defer_destroy(node, OptimisticNode::dealloc_ptr);
                }
                true
            }
            None => false,
        }
    }

    fn contains(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        self.with_validated_window("contains", bound, |window| unsafe {
            window.is_match(bound)
        })
    }

    fn keys(&self) -> Vec<u64> {
        let _read = G::pin();
        unsafe { chain::live_keys(self.head) }
    }
}

impl<T, G> Default for OptimisticSet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, G: Guard, S> Drop for OptimisticSet<T, G, S> {
    fn drop(&mut self) {
        // Retired nodes are owned by the guard, not by the chain
        let freed = unsafe { chain::free_chain(self.head) };
        tracing::debug!(kind = %SetKind::Optimistic, nodes = freed, "set dropped");
    }
}
