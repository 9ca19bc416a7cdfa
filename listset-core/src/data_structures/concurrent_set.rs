use crate::data_structures::SetKind;

/// A set of items shared between threads.
///
/// Membership is decided by the key derived from each item's hash, so two
/// items with equal hashes are the same element. All five list-based
/// variants implement this trait and can be used interchangeably:
///
/// ```text
/// ConcurrentSet<T>
///     │
///     ├── CoarseSet<T>            one lock for the whole list
///     ├── FineSet<T>              hand-over-hand node locks
///     ├── OptimisticSet<T, G>     unlocked search, lock + re-walk validation
///     ├── LazySet<T, G>           unlocked search, lock + mark validation
///     └── LockFreeSet<T, G>       CAS on marked successor pointers
/// ```
///
pub trait ConcurrentSet<T: ?Sized>: Send + Sync {
    /// Which synchronization discipline this instance uses.
    fn kind(&self) -> SetKind;

    /// Insert `item`.
    ///
    /// Returns `true` if inserted, `false` if an item with the same key is
    /// already present.
    ///
    fn add(&self, item: &T) -> bool;

    /// Remove `item`.
    ///
    /// Returns `true` if removed, `false` if not present.
    ///
    fn remove(&self, item: &T) -> bool;

    /// Check whether a live item with the same key is present.
    fn contains(&self, item: &T) -> bool;

    /// Keys of all live items in chain order.
    ///
    /// Only meaningful at a quiescent point (e.g. after worker threads have
    /// joined); concurrent mutations may or may not be reflected.
    ///
    fn keys(&self) -> Vec<u64>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
