//! Error types for lock groups and the canvas document.

use thiserror::Error;

use crate::lock::GroupId;
use crate::ravel::RavelId;

/// Errors raised by the lock-group protocol and canvas operations.
///
/// Membership races (a broadcast from a ravel that has left its group, a
/// removal of a ravel that is not a member) are not errors and never show
/// up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Two lock rows resolve to the same handle of the broadcasting ravel.
    #[error("multiple locks found on handle {0}")]
    MultipleLocks(String),
    /// A lock row does not have one slot per ravel.
    #[error("insufficient data on line {line}: expected {expected} handle names, found {found}")]
    InsufficientData {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A handle name is claimed by more than one row for the same ravel.
    #[error("duplicate handle name {0}")]
    DuplicateHandle(String),
    /// A ravel carries two handles with this name.
    #[error("ambiguous handle name {0}")]
    AmbiguousHandles(String),
    #[error("ravel not found: {0}")]
    UnknownRavel(RavelId),
    #[error("lock group not found: {0}")]
    UnknownGroup(GroupId),
    #[error("handle not found: {0}")]
    UnknownHandle(String),
    #[error("lock row {0} does not exist")]
    UnknownRow(usize),
    /// Linking needs at least two live ravels.
    #[error("cannot lock fewer than two ravels")]
    TooFewRavels,
    /// A state lock is not wired to a live ravel.
    #[error("state lock is not connected to a ravel")]
    Unconnected,
}

impl LockError {
    /// Creates an unknown-handle error.
    pub fn unknown_handle(name: impl Into<String>) -> Self {
        Self::UnknownHandle(name.into())
    }
}

/// Result type for lock-group operations.
pub type LockResult<T> = Result<T, LockError>;
