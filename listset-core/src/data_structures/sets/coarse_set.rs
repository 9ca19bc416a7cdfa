use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::data_structures::internal::chain::{self, item_bound};
use crate::data_structures::{Bound, ChainNode, ConcurrentSet, DefaultKeyHasher, SetKind};

type NodePtr = *mut CoarseNode;

struct CoarseNode {
    bound: Bound,
    next: NodePtr,
}

impl CoarseNode {
    fn new(bound: Bound, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(CoarseNode { bound, next }))
    }
}

impl ChainNode for CoarseNode {
    fn bound(&self) -> Bound {
        self.bound
    }

    fn successor(&self) -> NodePtr {
        self.next
    }
}

/// The chain behind the set's single lock.
struct Chain {
    head: NodePtr,
}

// Safety: the chain is only reached through the Mutex that owns it.
unsafe impl Send for Chain {}

/// Sorted-list set serialized by one lock.
///
/// Every operation, `contains` included, holds the lock for its whole
/// traversal, so operations are trivially linearizable and never run in
/// parallel. This is the correctness baseline for the other variants.
///
pub struct CoarseSet<T: ?Sized, S = DefaultKeyHasher> {
    chain: Mutex<Chain>,
    hasher: S,
    _phantom: PhantomData<fn(&T)>,
}

impl<T> CoarseSet<T, DefaultKeyHasher>
where
    T: Hash + ?Sized,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultKeyHasher::default())
    }
}

impl<T, S> CoarseSet<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        let tail = CoarseNode::new(Bound::PosInf, ptr::null_mut());
        let head = CoarseNode::new(Bound::NegInf, tail);
        tracing::debug!(kind = %SetKind::Coarse, "set created");

        CoarseSet {
            chain: Mutex::new(Chain { head }),
            hasher,
            _phantom: PhantomData,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Chain> {
        // No operation leaves the chain half-linked, so poisoning is harmless
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, S> ConcurrentSet<T> for CoarseSet<T, S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Send + Sync,
{
    fn kind(&self) -> SetKind {
        SetKind::Coarse
    }

    fn add(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let list = self.lock();

        unsafe {
            let window = chain::search(list.head, bound);
            if window.is_match(bound) {
                return false;
            }

            (*window.pred).next = CoarseNode::new(bound, window.curr);
        }
        true
    }

    fn remove(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let list = self.lock();

        unsafe {
            let window = chain::search(list.head, bound);
            if !window.is_match(bound) {
                return false;
            }

            (*window.pred).next = (*window.curr).next;
            // Unreachable from HEAD and nobody else holds the lock
            CoarseNode::dealloc_ptr(window.curr);
        }
        true
    }

    fn contains(&self, item: &T) -> bool {
        let bound = item_bound(&self.hasher, item);
        let list = self.lock();

        unsafe { chain::search(list.head, bound).is_match(bound) }
    }

    fn keys(&self) -> Vec<u64> {
        let list = self.lock();
        unsafe { chain::live_keys(list.head) }
    }
}

impl<T> Default for CoarseSet<T, DefaultKeyHasher>
where
    T: Hash + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, S> Drop for CoarseSet<T, S> {
    fn drop(&mut self) {
        let list = self.chain.get_mut().unwrap_or_else(PoisonError::into_inner);
        let freed = unsafe { chain::free_chain(list.head) };
        tracing::debug!(kind = %SetKind::Coarse, nodes = freed, "set dropped");
    }
}
