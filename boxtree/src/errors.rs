//! Error types for R-tree operations.

use thiserror::Error;

/// Errors that can occur while constructing or mutating an R-tree.
///
/// None of these are retried by the library; every failure is surfaced to the
/// caller. A successful operation always leaves the tree satisfying its
/// structural invariants.
///
/// # Examples
///
/// ```rust
/// use boxtree::{Point, TreeError};
///
/// let err = Point::<i64, 2>::from_slice(&[1]).unwrap_err();
/// assert!(matches!(err, TreeError::DimensionMismatch { expected: 2, actual: 1 }));
/// ```
#[derive(Debug, Error)]
pub enum TreeError {
    /// Construction-time misconfiguration of the capacity parameters.
    #[error("invalid capacity configuration: {0}")]
    InvalidCapacity(String),

    /// A coordinate list of the wrong length was supplied for a point.
    /// The operation that produced it is a no-op.
    #[error("point has {actual} coordinate(s) but the tree is {expected}-dimensional")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The insertion descent exhausted the maximum tree depth. This indicates
    /// pathological fan-out degradation and is fatal to the operation.
    #[error("maximum tree depth of {0} exceeded during insertion descent")]
    TreeTooDeep(usize),

    /// The supplied search position was invalidated by a mutation of the
    /// tree since the search that produced it.
    #[error("search position is stale; the tree has been modified since the search")]
    StaleHandle,

    /// A structural invariant does not hold. Fatal and diagnostic.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// A node with an impossible type was encountered. This is an internal
    /// assertion and indicates memory corruption.
    #[error("unexpected node type encountered")]
    UnknownNodeType,
}

/// Result type for R-tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
