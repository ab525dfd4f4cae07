//! Capacity configuration for the R-tree.
//!
//! The fan-out bounds and the depth limit are compile-time constants supplied
//! through the [`Capacity`] trait, so that different trees with different
//! node sizes are distinct types. Dimensionality is a const generic on the
//! tree itself because Rust array lengths must come from const generics.

use crate::errors::{TreeError, TreeResult};

/// Compile-time capacity parameters of an R-tree.
///
/// The R*-tree split algorithm requires `MIN_FANOUT <= MAX_FANOUT / 2`;
/// otherwise there would be no valid way to distribute an overfull node's
/// children into two groups. [`validate::<C>()`](validate) enforces this at
/// construction time.
pub trait Capacity {
    /// Minimum number of children of a non-root directory node.
    const MIN_FANOUT: usize;
    /// Maximum number of children of a directory node.
    const MAX_FANOUT: usize;
    /// Maximum number of levels an insertion descent may visit.
    const MAX_TREE_DEPTH: usize;
}

/// Default capacity: fan-out between 40 and 100, depth capped at 100.
///
/// # Examples
///
/// ```rust
/// use boxtree::{Capacity, DefaultCapacity};
///
/// assert_eq!(DefaultCapacity::MIN_FANOUT, 40);
/// assert_eq!(DefaultCapacity::MAX_FANOUT, 100);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCapacity;

impl Capacity for DefaultCapacity {
    const MIN_FANOUT: usize = 40;
    const MAX_FANOUT: usize = 100;
    const MAX_TREE_DEPTH: usize = 100;
}

/// Number of candidate distributions per axis during a split.
pub(crate) const fn distribution_count<C: Capacity>() -> usize {
    C::MAX_FANOUT - 2 * C::MIN_FANOUT + 2
}

/// Validates a capacity configuration together with the tree dimensionality.
pub(crate) fn validate<C: Capacity>(dimensions: usize) -> TreeResult<()> {
    if dimensions == 0 {
        return Err(TreeError::InvalidCapacity(
            "dimension count must be at least 1".into(),
        ));
    }

    if C::MIN_FANOUT == 0 {
        return Err(TreeError::InvalidCapacity(
            "minimum fan-out must be at least 1".into(),
        ));
    }

    if C::MIN_FANOUT > C::MAX_FANOUT / 2 {
        return Err(TreeError::InvalidCapacity(format!(
            "minimum fan-out {} must not exceed half of maximum fan-out {}",
            C::MIN_FANOUT,
            C::MAX_FANOUT
        )));
    }

    if C::MAX_TREE_DEPTH == 0 {
        return Err(TreeError::InvalidCapacity(
            "maximum tree depth must be at least 1".into(),
        ));
    }

    Ok(())
}
