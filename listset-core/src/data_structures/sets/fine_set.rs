use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::data_structures::internal::chain::{self, item_bound, lock_node};
use crate::data_structures::{Bound, ChainNode, ConcurrentSet, DefaultKeyHasher, SetKind};

type NodePtr = *mut FineNode;

struct FineNode {
    bound: Bound,
    lock: Mutex<()>,
    // Only written with this node's lock held; read with it held too
    next: AtomicPtr<FineNode>,
}

impl FineNode {
    fn new(bound: Bound, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(FineNode {
            bound,
            lock: Mutex::new(()),
            next: AtomicPtr::new(next),
        }))
    }

    #[inline]
    fn get_next(&self) -> NodePtr {
        self.next.load(Ordering::Acquire)
    }

    #[inline]
    fn set_next(&self, next: NodePtr) {
        self.next.store(next, Ordering::Release)
    }
}

impl ChainNode for FineNode {
    fn bound(&self) -> Bound {
        self.bound
    }

    fn successor(&self) -> NodePtr {
        self.get_next()
    }
}

// Window with both ends locked.
//
// Field order matters: `curr_guard` is declared first so it is released
// before `pred_guard` when the window is dropped.
struct LockedWindow<'a> {
    curr_guard: MutexGuard<'a, ()>,
    pred_guard: MutexGuard<'a, ()>,
    pred: NodePtr,
    curr: NodePtr,
}

/// Sorted-list set with one lock per node, traversed hand-over-hand.
///
/// ```text
///  step 1:  [HEAD]═[ a ]─( b )─( c )─[TAIL]     ═ both ends locked
///  step 2:  (HEAD)─[ a ]═[ b ]─( c )─[TAIL]     a's successor locked
///                                               before HEAD released
/// ```
///
/// A thread holds at most two locks, always taken in list order, so no
/// cycle of waiters can form. Threads working on disjoint parts of the list
/// run in parallel, but every traversal still serializes at HEAD.
///
/// Nodes are freed as soon as they are unlinked: reaching a node requires
/// its predecessor's lock, which the remover holds until the node is gone.
///
pub struct FineSet<T: ?Sized, S = DefaultKeyHasher> {
    head: NodePtr,
    hasher: S,
    _phantom: PhantomData<fn(&T)>,
}

// Safety: every node is only read or written under the node locks.
unsafe impl<T: ?Sized, S: Send> Send for FineSet<T, S> {}
unsafe impl<T: ?Sized, S: Sync> Sync for FineSet<T, S> {}

impl<T> FineSet<T, DefaultKeyHasher>
where
    T: Hash + ?Sized,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<T, S> FineSet<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        let tail = FineNode::new(Bound::PosInf, ptr::null_mut());
        let head = FineNode::new(Bound::NegInf, tail);
        tracing::debug!(kind = %SetKind::Fine, "set created");

        FineSet {
            head,
            hasher,
            _phantom: PhantomData,
        }
    }

    /// Lock-couple down the list to the window of `bound`.
    ///
    /// The returned window holds the locks of both `pred` and `curr`.
    fn lock_window(&self, bound: Bound) -> LockedWindow<'_> {
        unsafe {
            let mut pred = self.head;
            let mut pred_guard = lock_node(&(*pred).lock);
            let mut curr = (*pred).get_next();
            let mut curr_guard = lock_node(&(*curr).lock);

            while (*curr).bound < bound {
                // Assigning drops the old predecessor's guard; the new one
                // (curr) is already held.
                pred_guard = curr_guard;
                pred = curr;
                curr = (*pred).get_next();
                curr_guard = lock_node(&(*curr).lock);
            }

            LockedWindow {
                curr_guard,
                pred_guard,
                pred,
                curr,
            }
        }
    }
}

impl<T, S> ConcurrentSet<T> for FineSet<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Send + Sync,
{
    fn kind(&self) -> SetKind {
        SetKind::Fine
    }

    fn add(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let window = self.lock_window(bound);

        unsafe {
            if (*window.curr).bound == bound {
                return false;
            }

            (*window.pred).set_next(FineNode::new(bound, window.curr));
        }
        true
    }

    fn remove(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let LockedWindow {
            curr_guard,
            pred_guard,
            pred,
            curr,
        } = self.lock_window(bound);

        unsafe {
            if (*curr).bound != bound {
                return false;
            }

            (*pred).set_next((*curr).get_next());

            // Release curr before freeing it; pred stays locked so no other
            // thread can have reached curr in the meantime.
            drop(curr_guard);
            FineNode::dealloc_ptr(curr);
        }
        drop(pred_guard);
        true
    }

    fn contains(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let window = self.lock_window(bound);

        unsafe { (*window.curr).bound == bound }
    }

    fn keys(&self) -> Vec<u64> {
        let mut keys = Vec::new();

        // Hand-over-hand walk to the tail
        unsafe {
            let mut pred_guard = lock_node(&(*self.head).lock);
            let mut curr = (*self.head).get_next();

            loop {
                let curr_guard = lock_node(&(*curr).lock);
                match (*curr).bound {
                    Bound::Key(key) => keys.push(key),
                    _ => break,
                }
                pred_guard = curr_guard;
                curr = (*curr).get_next();
            }
            drop(pred_guard);
        }

        keys
    }
}

impl<T> Default for FineSet<T, DefaultKeyHasher>
where
    T: Hash + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, S> Drop for FineSet<T, S> {
    fn drop(&mut self) {
        let freed = unsafe { chain::free_chain(self.head) };
        tracing::debug!(kind = %SetKind::Fine, nodes = freed, "set dropped");
    }
}
