//! Data structures for concurrent sets.
//!
//! # Organization
//!
//! - [`sets`] - The five sorted-list set variants
//! - [`concurrent_set`] - The operation contract they share
//! - [`set_kind`] - Runtime selection of a variant by name
//! - `internal` - Chain helpers and marked pointers (pub(crate))

pub(crate) mod internal;
pub mod sets;

pub mod concurrent_set;
pub mod set_kind;

pub use concurrent_set::ConcurrentSet;
pub use set_kind::SetKind;
pub use sets::{CoarseSet, FineSet, LazySet, LockFreeSet, OptimisticSet};

pub use internal::{Bound, DefaultKeyHasher};
pub(crate) use internal::{AtomicMarkedPtr, ChainNode, MarkedPtr, Window};
