// Successor pointer carrying a deletion mark in its least significant bit.
//
// Bit layout:
//   Bit 0: DELETE_MARK - the node OWNING this pointer is logically deleted
//
// Nodes are heap allocated with alignment >= 2, so bit 0 of a real node
// address is always zero. Pointer and mark live in one word and are read,
// written and compared together.
//
use std::sync::atomic::{AtomicPtr, Ordering};

const DELETE_MARK: usize = 0b1;

/// A (pointer, mark) pair packed into one word.
pub(crate) struct MarkedPtr<T> {
    raw: *mut T,
}

// Manual impls to avoid requiring T: Clone/Copy
impl<T> Copy for MarkedPtr<T> {}

impl<T> Clone for MarkedPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for MarkedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for MarkedPtr<T> {}

impl<T> std::fmt::Debug for MarkedPtr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkedPtr")
            .field("ptr", &self.as_ptr())
            .field("marked", &self.is_marked())
            .finish()
    }
}

impl<T> MarkedPtr<T> {
    /// Pack an unmarked pointer with a mark.
    #[inline]
    pub(crate) fn new(ptr: *mut T, marked: bool) -> Self {
        debug_assert_eq!(ptr as usize & DELETE_MARK, 0, "pointer is not 2-aligned");
        let raw = if marked {
            (ptr as usize | DELETE_MARK) as *mut T
        } else {
            ptr
        };
        MarkedPtr { raw }
    }

    #[inline]
    fn from_raw(raw: *mut T) -> Self {
        MarkedPtr { raw }
    }

    /// The pointer without the mark (the one you dereference).
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        (self.raw as usize & !DELETE_MARK) as *mut T
    }

    #[inline]
    pub(crate) fn is_marked(&self) -> bool {
        (self.raw as usize & DELETE_MARK) != 0
    }

    /// Same pointer with the given mark.
    #[inline]
    pub(crate) fn with_mark(&self, marked: bool) -> Self {
        MarkedPtr::new(self.as_ptr(), marked)
    }
}

/// Atomic cell over a [`MarkedPtr`].
///
/// Every CAS compares pointer and mark together, so "still points at `curr`"
/// and "owner not deleted" are checked in one step.
pub(crate) struct AtomicMarkedPtr<T> {
    raw: AtomicPtr<T>,
}

impl<T> AtomicMarkedPtr<T> {
    pub(crate) fn new(ptr: MarkedPtr<T>) -> Self {
        AtomicMarkedPtr {
            raw: AtomicPtr::new(ptr.raw),
        }
    }

    /// Load (Acquire ordering)
    #[inline]
    pub(crate) fn load(&self) -> MarkedPtr<T> {
        MarkedPtr::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Store (Release ordering). Only valid before the owner is published.
    #[inline]
    pub(crate) fn store(&self, ptr: MarkedPtr<T>) {
        self.raw.store(ptr.raw, Ordering::Release)
    }

    /// CAS (AcqRel/Acquire ordering)
    ///
    /// On failure returns the value actually found.
    #[inline]
    pub(crate) fn compare_exchange(
        &self,
        expected: MarkedPtr<T>,
        new: MarkedPtr<T>,
    ) -> Result<MarkedPtr<T>, MarkedPtr<T>> {
        self.raw
            .compare_exchange(expected.raw, new.raw, Ordering::AcqRel, Ordering::Acquire)
            .map(MarkedPtr::from_raw)
            .map_err(MarkedPtr::from_raw)
    }
}
