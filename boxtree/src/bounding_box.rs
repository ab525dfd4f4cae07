//! Axis-aligned bounding boxes in N dimensions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::{Coordinate, Point};

/// An axis-aligned bounding box represented by its start (minimum) and end
/// (maximum) corner points.
///
/// For every dimension `d` the invariant `start[d] <= end[d]` is expected to
/// hold; the tree's own extents always satisfy it. Containment checks are
/// inclusive on both ends, so a degenerate box with `start == end` behaves
/// like a point.
///
/// # Examples
///
/// ```rust
/// use boxtree::{BoundingBox, Point};
///
/// let bb = BoundingBox::new(Point::new([0, 0]), Point::new([10, 10]));
/// assert!(bb.contains_point(&Point::new([10, 0])));
/// assert!(!bb.contains_point(&Point::new([11, 5])));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Coordinate + Serialize",
    deserialize = "K: Coordinate + Deserialize<'de>"
))]
pub struct BoundingBox<K, const D: usize> {
    /// The corner with the minimum coordinate along every dimension.
    pub start: Point<K, D>,
    /// The corner with the maximum coordinate along every dimension.
    pub end: Point<K, D>,
}

impl<K: Coordinate, const D: usize> Default for BoundingBox<K, D> {
    fn default() -> Self {
        Self {
            start: Point::default(),
            end: Point::default(),
        }
    }
}

impl<K: Coordinate, const D: usize> BoundingBox<K, D> {
    /// Creates a bounding box from its two corner points.
    pub fn new(start: Point<K, D>, end: Point<K, D>) -> Self {
        Self { start, end }
    }

    /// Creates a degenerate box covering a single point.
    pub fn at(position: Point<K, D>) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Checks if this box contains a point, inclusive on both ends.
    pub fn contains_point(&self, pt: &Point<K, D>) -> bool {
        for dim in 0..D {
            if pt[dim] < self.start[dim] || self.end[dim] < pt[dim] {
                return false;
            }
        }

        true
    }

    /// Checks if this box fully encloses another box, inclusive on both ends.
    pub fn contains(&self, other: &BoundingBox<K, D>) -> bool {
        for dim in 0..D {
            if other.start[dim] < self.start[dim] || self.end[dim] < other.end[dim] {
                return false;
            }
        }

        true
    }

    /// Checks if `other` shares a start or end coordinate with this box along
    /// some dimension, i.e. whether `other` may lie on this box's outer
    /// envelope. Used to decide whether removing a child can shrink the
    /// extent.
    pub fn contains_at_boundary(&self, other: &BoundingBox<K, D>) -> bool {
        for dim in 0..D {
            if self.start[dim] == other.start[dim] || other.end[dim] == self.end[dim] {
                return true;
            }
        }

        false
    }

    /// Checks if `start <= end` holds along every dimension.
    pub fn is_valid(&self) -> bool {
        for dim in 0..D {
            if self.end[dim] < self.start[dim] {
                return false;
            }
        }

        true
    }
}

impl<K: Coordinate, const D: usize> fmt::Display for BoundingBox<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
