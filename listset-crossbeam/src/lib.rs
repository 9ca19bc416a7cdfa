//! Crossbeam-based reclamation for listset sets.
//!
//! This crate provides `EpochGuard`, an implementation of the `Guard` trait
//! using crossbeam-epoch for memory reclamation, and aliases for the three
//! sets that need one.
//!
//! # Usage
//!
//! ```ignore
//! use listset_core::ConcurrentSet;
//! use listset_crossbeam::EpochLockFreeSet;
//!
//! let set: EpochLockFreeSet<i64> = EpochLockFreeSet::new();
//! set.add(&42);
//! ```

pub mod epoch_guard;

use listset_core::data_structures::{LazySet, LockFreeSet, OptimisticSet};

// Export the Guard implementation
pub use epoch_guard::EpochGuard;

pub type EpochOptimisticSet<T> = OptimisticSet<T, EpochGuard>;
pub type EpochLazySet<T> = LazySet<T, EpochGuard>;
pub type EpochLockFreeSet<T> = LockFreeSet<T, EpochGuard>;
