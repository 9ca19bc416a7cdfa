use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::data_structures::{
    CoarseSet, ConcurrentSet, FineSet, LazySet, LockFreeSet, OptimisticSet,
};
use crate::error::SetError;
use crate::guard::Guard;

/// The five synchronization disciplines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SetKind {
    Coarse,
    Fine,
    Optimistic,
    Lazy,
    LockFree,
}

impl SetKind {
    pub const ALL: [SetKind; 5] = [
        SetKind::Coarse,
        SetKind::Fine,
        SetKind::Optimistic,
        SetKind::Lazy,
        SetKind::LockFree,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SetKind::Coarse => "coarse",
            SetKind::Fine => "fine",
            SetKind::Optimistic => "optimistic",
            SetKind::Lazy => "lazy",
            SetKind::LockFree => "lock-free",
        }
    }

    /// Whether operations of this kind can block on a lock.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, SetKind::LockFree)
    }

    /// Create an empty set of this kind.
    ///
    /// `G` is the reclamation guard for the variants that traverse without
    /// locks (optimistic, lazy, lock-free); the others free nodes directly.
    ///
    pub fn build<T, G>(self) -> Box<dyn ConcurrentSet<T>>
    where
        T: Hash + ?Sized + 'static,
        G: Guard + 'static,
    {
        match self {
            SetKind::Coarse => Box::new(CoarseSet::<T>::new()),
            SetKind::Fine => Box::new(FineSet::<T>::new()),
            SetKind::Optimistic => Box::new(OptimisticSet::<T, G>::new()),
            SetKind::Lazy => Box::new(LazySet::<T, G>::new()),
            SetKind::LockFree => Box::new(LockFreeSet::<T, G>::new()),
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SetKind {
    type Err = SetError;

    /// Accepts short names (`lock-free`, `lock_free`, `lockfree`) and the
    /// class-style names (`LockFreeSet`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let name = normalized
            .strip_suffix("set")
            .unwrap_or(normalized.as_str());

        match name {
            "coarse" | "coarsegrained" => Ok(SetKind::Coarse),
            "fine" | "finegrained" => Ok(SetKind::Fine),
            "optimistic" => Ok(SetKind::Optimistic),
            "lazy" => Ok(SetKind::Lazy),
            "lockfree" => Ok(SetKind::LockFree),
            _ => Err(SetError::UnknownKind(s.to_string())),
        }
    }
}
