//! Sorted node chain shared by every set variant.
//!
//! Every chain is bounded by two sentinels:
//!
//! ```text
//! ┌────────┐    ┌──────┐    ┌──────┐    ┌────────┐
//! │  HEAD  │───►│  k1  │───►│  k2  │───►│  TAIL  │
//! │ NegInf │    │      │    │      │    │ PosInf │
//! └────────┘    └──────┘    └──────┘    └────────┘
//! ```
//!
//! INVARIANTS:
//! 1. Keys are strictly increasing from HEAD to TAIL
//! 2. HEAD and TAIL are never removed and never carry an item key
//! 3. Traversal from HEAD always reaches TAIL
//!
//! Variants differ only in how they protect the `next` links. The helpers in
//! this module perform plain traversals and are only sound when the caller
//! keeps every visited node alive (by lock, by guard or by quiescence).

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hasher used to derive node keys when the caller doesn't supply one.
///
/// Unkeyed, so the same item maps to the same key in every set instance.
pub type DefaultKeyHasher = BuildHasherDefault<DefaultHasher>;

/// Position of a node in the key order.
///
/// Sentinels sit outside the item key space, so every `u64` is a usable key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    NegInf,
    Key(u64),
    PosInf,
}

impl Bound {
    /// Key of a regular node, `None` for sentinels.
    #[inline]
    pub fn key(&self) -> Option<u64> {
        match self {
            Bound::Key(key) => Some(*key),
            _ => None,
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Bound::Key(_))
    }
}

/// Derive the chain position of `item`.
///
/// Two items hashing to the same value are the same set element.
#[inline]
pub(crate) fn item_bound<T, S>(hasher: &S, item: &T) -> Bound
where
    T: Hash + ?Sized,
    S: BuildHasher,
{
    Bound::Key(hasher.hash_one(item))
}

/// Acquire a node lock.
///
/// Node locks guard no data, so a poisoned lock carries no broken state.
#[inline]
pub(crate) fn lock_node(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) trait ChainNode: Sized {
    fn bound(&self) -> Bound;

    /// Successor with any mark bits stripped.
    fn successor(&self) -> *mut Self;

    /// Whether the node is a live set member (not logically deleted).
    fn is_live(&self) -> bool {
        true
    }

    /// Deallocate this node.
    ///
    /// # Safety
    /// - `ptr` must have been allocated with `Box::new` by the owning set
    /// - Must only be called once, and the node must not be accessed afterwards
    ///
    unsafe fn dealloc_ptr(ptr: *mut Self) {
        unsafe { drop(Box::from_raw(ptr)) };
    }
}

/// Predecessor/candidate pair bracketing a search key.
///
/// `curr` is the first node whose bound is >= the key: either the member
/// carrying the key, or the node the key would be inserted in front of.
pub(crate) struct Window<N> {
    pub pred: *mut N,
    pub curr: *mut N,
}

// Manual impls to avoid requiring N: Clone/Copy
impl<N> Copy for Window<N> {}

impl<N> Clone for Window<N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: ChainNode> Window<N> {
    /// Whether `curr` carries exactly `bound`.
    ///
    /// # Safety
    /// `curr` must point to a node that is still allocated.
    #[inline]
    pub unsafe fn is_match(&self, bound: Bound) -> bool {
        unsafe { (*self.curr).bound() == bound }
    }
}

/// Walk from `head` to the window of `bound`, following raw successors.
///
/// # Safety
/// `head` must be a HEAD sentinel and every node reachable from it must stay
/// allocated for the duration of the call.
pub(crate) unsafe fn search<N: ChainNode>(head: *mut N, bound: Bound) -> Window<N> {
    let mut pred = head;
    let mut curr = unsafe { (*pred).successor() };

    // TAIL is PosInf, so the walk always stops
    while unsafe { (*curr).bound() } < bound {
        pred = curr;
        curr = unsafe { (*curr).successor() };
    }

    Window { pred, curr }
}

/// Keys of all live nodes, in chain order.
///
/// # Safety
/// Same as [`search`].
pub(crate) unsafe fn live_keys<N: ChainNode>(head: *mut N) -> Vec<u64> {
    let mut keys = Vec::new();
    let mut curr = unsafe { (*head).successor() };

    while !curr.is_null() {
        let node = unsafe { &*curr };
        if let Some(key) = node.bound().key() {
            if node.is_live() {
                keys.push(key);
            }
        }
        curr = node.successor();
    }

    keys
}

/// Free every node reachable from `head`, sentinels included.
///
/// Returns the number of regular (non-sentinel) nodes freed.
///
/// # Safety
/// The caller must have exclusive access to the chain, and no node reachable
/// from `head` may also be scheduled for deferred destruction.
pub(crate) unsafe fn free_chain<N: ChainNode>(head: *mut N) -> usize {
    let mut freed = 0;
    let mut curr = head;

    while !curr.is_null() {
        unsafe {
            let next = (*curr).successor();
            if !(*curr).bound().is_sentinel() {
                freed += 1;
            }
            N::dealloc_ptr(curr);
            curr = next;
        }
    }

    freed
}
