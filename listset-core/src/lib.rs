pub mod common_tests;
pub mod data_structures;
pub mod error;
pub mod guard;

pub use data_structures::{
    Bound, CoarseSet, ConcurrentSet, DefaultKeyHasher, FineSet, LazySet, LockFreeSet,
    OptimisticSet, SetKind,
};
pub use error::SetError;
pub use guard::{DeferredGuard, Guard};
