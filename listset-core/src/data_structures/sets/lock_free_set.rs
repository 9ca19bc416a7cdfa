use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::ptr;

use crate::data_structures::internal::chain::{self, item_bound};
use crate::data_structures::{
    AtomicMarkedPtr, Bound, ChainNode, ConcurrentSet, DefaultKeyHasher, MarkedPtr, SetKind,
    Window,
};
use crate::guard::Guard;

type NodePtr = *mut LockFreeNode;

///
/// Lock-free sorted list set based on Harris's 'A Pragmatic Implementation of
/// Non-Blocking Linked-Lists', as presented by Herlihy and Shavit.
///
// =============================================================================
// MARKED SUCCESSOR POINTERS
// =============================================================================
//
// The mark bit on node.next says the NODE ITSELF is logically deleted:
//
//          pred ──────► curr ──╳───► succ
//                              │
//                          (curr marked)
//
// A node can therefore only be linked after or unlinked from an unmarked
// predecessor: both CAS operations below expect `(x, unmarked)` in pred.next,
// and fail once pred has been marked.
//
// =============================================================================
// REMOVE (Two-Phase Delete)
// =============================================================================
//
// Phase 1: LOGICAL DELETE  CAS curr.next (succ, 0) -> (succ, 1)  [LINEARIZATION]
// Phase 2: PHYSICAL UNLINK CAS pred.next (curr, 0) -> (succ, 0)  [best effort]
//
// If phase 2 fails, curr stays in the chain, marked. The next find() that
// walks over it snips it out with the same CAS, so every marked node is
// eventually unlinked by exactly one successful CAS. Whoever wins that CAS
// retires the node.
//
// =============================================================================
// FIND FAILURE
// =============================================================================
//
// When snipping fails, pred.next is no longer (curr, 0): pred was marked, or
// curr was snipped or got a new predecessor. The window is stale, so find()
// restarts from HEAD.
//
struct LockFreeNode {
    bound: Bound,
    next: AtomicMarkedPtr<LockFreeNode>,
}

impl LockFreeNode {
    fn new(bound: Bound, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(LockFreeNode {
            bound,
            next: AtomicMarkedPtr::new(MarkedPtr::new(next, false)),
        }))
    }
}

impl ChainNode for LockFreeNode {
    fn bound(&self) -> Bound {
        self.bound
    }

    fn successor(&self) -> NodePtr {
        self.next.load().as_ptr()
    }

    fn is_live(&self) -> bool {
        !self.next.load().is_marked()
    }
}

/// Sorted-list set without locks.
///
/// `add` and `remove` commit with a single CAS and retry on conflict; any
/// thread that finds a logically deleted node on its path helps unlink it,
/// so some thread always makes progress. `contains` never writes.
///
pub struct LockFreeSet<T: ?Sized, G: Guard, S = DefaultKeyHasher> {
    head: NodePtr,
    /// Shared guard instance for deferred destruction of unlinked nodes.
    guard: G,
    hasher: S,
    _phantom: PhantomData<fn(&T)>,
}

// Safety: links are only changed by CAS, and unlinked nodes are only freed
// through the guard.
unsafe impl<T: ?Sized, G: Guard, S: Send> Send for LockFreeSet<T, G, S> {}
unsafe impl<T: ?Sized, G: Guard, S: Sync> Sync for LockFreeSet<T, G, S> {}

impl<T, G> LockFreeSet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<T, G, S> LockFreeSet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        let tail = LockFreeNode::new(Bound::PosInf, ptr::null_mut());
        let head = LockFreeNode::new(Bound::NegInf, tail);
        tracing::debug!(kind = %SetKind::LockFree, "set created");

        LockFreeSet {
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

    /// Unlink `curr` from `pred` if `pred` still points at it, unmarked.
    ///
    /// On success the caller's thread owns the node and retires it.
    ///
    /// # Safety
    /// `curr` must be marked, `succ` must be its successor, and the caller
    /// must be pinned.
    unsafe fn snip(&self, pred: NodePtr, curr: NodePtr, succ: NodePtr) -> bool {
        let unlinked = unsafe {
            (*pred)
                .next
                .compare_exchange(MarkedPtr::new(curr, false), MarkedPtr::new(succ, false))
                .is_ok()
        };

        if unlinked {
            unsafe {
                self.guard.defer_destroy(curr, LockFreeNode::dealloc_ptr);
            }
        }
        unlinked
    }

    /// Core operation: find the window of `bound`, unlinking every marked
    /// node met on the way.
    ///
    /// Both ends of the returned window were unmarked when visited.
    ///
    /// # Safety
    /// The caller must be pinned.
    unsafe fn find(&self, bound: Bound) -> Window<LockFreeNode> {
        'retry: loop {
            unsafe {
                let mut pred = self.head;
                let mut curr = (*pred).next.load().as_ptr();

                loop {
                    let mut succ = (*curr).next.load();

                    while succ.is_marked() {
                        if !self.snip(pred, curr, succ.as_ptr()) {
                            tracing::trace!(
                                kind = %SetKind::LockFree,
                                op = "find",
                                key = ?bound,
                                "snip failed, restarting",
                            );
                            continue 'retry;
                        }
                        curr = succ.as_ptr();
                        succ = (*curr).next.load();
                    }

                    // TAIL is PosInf, so the walk always stops
                    if (*curr).bound >= bound {
                        return Window { pred, curr };
                    }

                    pred = curr;
                    curr = succ.as_ptr();
                }
            }
        }
    }
}

impl<T, G, S> ConcurrentSet<T> for LockFreeSet<T, G, S>
where
    T: Hash + ?Sized,
    G: Guard,
    S: BuildHasher + Send + Sync,
{
    fn kind(&self) -> SetKind {
        SetKind::LockFree
    }

    fn add(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();
        let new_node = LockFreeNode::new(bound, ptr::null_mut());

        loop {
            unsafe {
                let window = self.find(bound);

                if window.is_match(bound) {
                    // Never published, free it directly
                    LockFreeNode::dealloc_ptr(new_node);
                    return false;
                }

                (*new_node).next.store(MarkedPtr::new(window.curr, false));

                let linked = (*window.pred).next.compare_exchange(
                    MarkedPtr::new(window.curr, false),
                    MarkedPtr::new(new_node, false),
                );
                if linked.is_ok() {
                    return true;
                }
            }

            tracing::trace!(
                kind = %SetKind::LockFree,
                op = "add",
                key = ?bound,
                "link CAS failed, retrying",
            );
        }
    }

    fn remove(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        loop {
            unsafe {
                let window = self.find(bound);

                if !window.is_match(bound) {
                    return false;
                }

                // Expect an unmarked successor: if curr is already marked,
                // another remove won and this CAS must fail
                let succ = (*window.curr).next.load().with_mark(false);

                // Logical delete: the linearization point
                let marked = (*window.curr)
                    .next
                    .compare_exchange(succ, succ.with_mark(true));

                if marked.is_ok() {
                    // Best effort: a later find() finishes the job otherwise
                    self.snip(window.pred, window.curr, succ.as_ptr());
                    return true;
                }
            }

            tracing::trace!(
                kind = %SetKind::LockFree,
                op = "remove",
                key = ?bound,
                "mark CAS failed, retrying",
            );
        }
    }

    fn contains(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let _read = G::pin();

        // Read-only walk: marked nodes are skipped over, not unlinked
        unsafe {
            let window = chain::search(self.head, bound);
            window.is_match(bound) && (*window.curr).is_live()
        }
    }

    fn keys(&self) -> Vec<u64> {
        let _read = G::pin();
        unsafe { chain::live_keys(self.head) }
    }
}

impl<T, G> Default for LockFreeSet<T, G, DefaultKeyHasher>
where
    T: Hash + ?Sized,
    G: Guard,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, G: Guard, S> Drop for LockFreeSet<T, G, S> {
    fn drop(&mut self) {
        // Marked nodes that were never snipped are still linked and were
        // never retired, so freeing the whole chain frees them exactly once.
        let freed = unsafe { chain::free_chain(self.head) };
        tracing::debug!(kind = %SetKind::LockFree, nodes = freed, "set dropped");
    }
}

// ============================================================================
// Tests - Unique to LockFreeSet
// ============================================================================
// Note: Common tests are in tests/set_core_tests.rs
