//! List-based set implementations.
//!
//! The variants that traverse without locks are parameterized by a guard
//! type `G: Guard` that determines the memory reclamation strategy:
//!
//! - `DeferredGuard`: Testing - defers destruction until the set drops
//! - `EpochGuard`: Production - epoch-based reclamation (crossbeam-epoch)

pub mod coarse_set;
pub mod fine_set;
pub mod lazy_set;
pub mod lock_free_set;
pub mod optimistic_set;

pub use coarse_set::CoarseSet;
pub use fine_set::FineSet;
pub use lazy_set::LazySet;
pub use lock_free_set::LockFreeSet;
pub use optimistic_set::OptimisticSet;
