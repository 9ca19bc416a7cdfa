//! Internal implementation details.
//!
//! These are pub(crate) and not intended for external use, except for the
//! key types that appear in the public API.

pub mod chain;
pub mod marked_ptr;

pub use chain::{Bound, DefaultKeyHasher};
pub(crate) use chain::{ChainNode, Window};
pub(crate) use marked_ptr::{AtomicMarkedPtr, MarkedPtr};
