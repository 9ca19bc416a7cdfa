use thiserror::Error;

/// Errors raised while configuring a set.
///
/// Set operations themselves never fail: they answer with a boolean, and
/// conflicts between threads are retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    /// The variant selector doesn't name any known set.
    #[error("unknown set kind '{0}' (expected one of: coarse, fine, optimistic, lazy, lock-free)")]
    UnknownKind(String),
}
