use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::ptr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

use crate::data_structures::internal::chain::{self, item_bound, lock_node};
use crate::data_structures::{
    Bound, ChainNode, ConcurrentSet, DefaultKeyHasher, SetKind, Window,
};
use crate::guard::Guard;

type NodePtr = *mut LazyNode;

struct LazyNode {
    bound: Bound,
    lock: Mutex<()>,
    next: AtomicPtr<LazyNode>,
    /// Set (under the node's lock) when the node is logically deleted.
    marked: AtomicBool,
}

impl LazyNode {
    fn new(bound: Bound, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(LazyNode {
            bound,
            lock: Mutex::new(()),
            next: AtomicPtr::new(next),
            marked: AtomicBool::new(false),
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

    #[inline]
    fn is_marked(&self) -> bool {
        self.marked.load(Ordering::Acquire)
    }

    #[inline]
    fn mark(&self) {
        self.marked.store(true, Ordering::Release)
    }
}

impl ChainNode for LazyNode {
    fn bound(&self) -> Bound {
        self.bound
    }

    fn successor(&self) -> NodePtr {
        self.get_next()
    }

    fn is_live(&self) -> bool {
        !self.is_marked()
    }
}

/// Sorted-list set with lazy (two-phase) removal.
///
/// Like [`OptimisticSet`](super::OptimisticSet), searches run without locks
/// and mutations lock `(pred, curr)`. The difference is the mark flag:
///
/// ```text
/// remove(b):
///   1. mark b         pred ──► [b]* ──► succ     b invisible to contains
///   2. unlink b       pred ───────────► succ
/// ```
///
/// Since every removed node is marked before it is unlinked, "pred and curr
/// unmarked and adjacent" is enough to validate a window; no second walk is
/// needed. `contains` takes no locks at all.
///
/// INVARIANTS:
/// 1. Every unmarked node is reachable from HEAD
/// 2. Marking `curr` is the linearization point of a successful remove
///
pub struct LazySet<T: ?Sized, G: Guard, S = DefaultKeyHasher> {
    head: NodePtr,
    /// Shared guard instance for deferred destruction of removed nodes.
    guard: G,
    hasher: S,
    _phantom: PhantomData<fn(&T)>,
}

// Safety: links and marks are atomics written under node locks, and removed
// nodes are only freed through the guard.
unsafe impl<T: ?Sized, G: Guard, S: Send> Send for LazySet<T, G, S> {}
unsafe impl<T: ?Sized, G: Guard, S: Sync> Sync for LazySet<T, G, S> {}

impl<T, G> LazySet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<T, G, S> LazySet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        let tail = LazyNode::new(Bound::PosInf, ptr::null_mut());
        let head = LazyNode::new(Bound::NegInf, tail);
        tracing::debug!(kind = %SetKind::Lazy, "set created");

        LazySet {
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

    /// Local validation: both ends unmarked and still adjacent.
    ///
    /// # Safety
    /// Caller holds the locks of `pred` and `curr` and is pinned.
    unsafe fn validate(window: Window<LazyNode>) -> bool {
        unsafe {
            !(*window.pred).is_marked()
                && !(*window.curr).is_marked()
                && (*window.pred).get_next() == window.curr
        }
    }
}

impl<T, G, S> ConcurrentSet<T> for LazySet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher + Send + Sync,
{
    fn kind(&self) -> SetKind {
        SetKind::Lazy
    }

    fn add(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        loop {
            unsafe {
                let window = chain::search(self.head, bound);
                let _pred_guard = lock_node(&(*window.pred).lock);
                let _curr_guard = lock_node(&(*window.curr).lock);

                if Self::validate(window) {
                    if window.is_match(bound) {
                        return false;
                    }
                    (*window.pred).set_next(LazyNode::new(bound, window.curr));
                    return true;
                }
            }

            tracing::trace!(
                kind = %SetKind::Lazy,
                op = "add",
                key = ?bound,
                "validation failed, retrying",
            );
        }
    }

    fn remove(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        let removed = loop {
            unsafe {
                let window = chain::search(self.head, bound);
                let _pred_guard = lock_node(&(*window.pred).lock);
                let _curr_guard = lock_node(&(*window.curr).lock);

                if Self::validate(window) {
                    if !window.is_match(bound) {
                        return false;
                    }

                    // Logical delete, then physical unlink
                    (*window.curr).mark();
                    (*window.pred).set_next((*window.curr).get_next());
                    break window.curr;
                }
            }

            tracing::trace!(
                kind = %SetKind::Lazy,
                op = "remove",
                key = ?bound,
                "validation failed, retrying",
            );
        };

        // Unreachable from HEAD, but unlocked searches may still be on it
        unsafe {
            self.guard.defer_destroy(removed, LazyNode::dealloc_ptr);
        }
        true
    }

    fn contains(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        unsafe {
            let window = chain::search(self.head, bound);
            window.is_match(bound) && !(*window.curr).is_marked()
        }
    }

    fn keys(&self) -> Vec<u64> {
        let _read = G::pin();
        unsafe { chain::live_keys(self.head) }
    }
}

impl<T, G> Default for LazySet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, G: Guard, S> Drop for LazySet<T, G, S> {
    fn drop(&mut self) {
        let freed = unsafe { chain::free_chain(self.head) };
        tracing::debug!(kind = %SetKind::Lazy, nodes = freed, "set dropped");
    }
}
