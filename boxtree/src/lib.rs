//! # Boxtree - A Generic In-Memory R*-Tree
//!
//! This crate provides a height-balanced, multi-way spatial index over
//! axis-aligned bounding boxes in N dimensions, following the R*-tree
//! insertion and split heuristics of Beckmann et al.
//!
//! ## Features
//!
//! - **Generic Coordinates**: any numeric type with subtraction,
//!   multiplication, ordering and a zero default, integers and floats alike
//! - **Generic Payloads**: values are moved into the tree and borrowed back
//!   out through searches
//! - **N Dimensions**: dimensionality is a const generic, checked at compile
//!   time
//! - **R\* Heuristics**: minimum overlap-increase descent near the leaves,
//!   minimum sum-of-margins axis choice and minimum-overlap distribution
//!   choice on split
//! - **Erase With Repair**: removing a value shrinks ancestor extents, and a
//!   leaf that underflows is dissolved with its survivors re-inserted
//! - **Integrity Checking**: every structural invariant can be verified on
//!   demand, silently or with a full report through the `log` facade
//!
//! ## Quick Start
//!
//! ```rust
//! use boxtree::{Point, RTree};
//!
//! # fn main() -> Result<(), boxtree::TreeError> {
//! // 2-D tree storing strings with f64 coordinates.
//! let mut tree: RTree<f64, String, 2> = RTree::new()?;
//!
//! tree.insert(
//!     Point::new([0.0, 0.0]),
//!     Point::new([15.0, 20.0]),
//!     "first rectangle data".to_string(),
//! )?;
//! tree.insert_at(Point::new([5.0, 6.0]), "first point data".to_string())?;
//!
//! // Every value whose box contains (6, 6).
//! let hits = tree.search(&Point::new([6.0, 6.0]));
//! assert_eq!(hits.len(), 1);
//!
//! // Erase through a search position.
//! let pos = hits.iter().next().map(|e| e.position()).unwrap();
//! drop(hits);
//! tree.erase(pos)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Erase Semantics
//!
//! [`RTree::erase`] takes an [`EntryPosition`] minted from a search hit.
//! Positions are invalidated by any mutation; a stale position is rejected
//! with [`TreeError::StaleHandle`]. A leaf left under-full by a removal is
//! dissolved and its surviving entries re-inserted; an ancestor directory
//! that underflows as a result is dissolved the same way, with every value
//! in its subtree buffered and re-inserted through the ordinary insertion
//! path.

pub mod bounding_box;
pub mod capacity;
pub mod errors;
pub mod geometry;
pub mod point;
pub mod rtree;

// Re-export the core types.
pub use bounding_box::BoundingBox;
pub use capacity::{Capacity, DefaultCapacity};
pub use errors::{TreeError, TreeResult};
pub use point::{Coordinate, Point};
pub use rtree::{
    CheckMode, Entry, EntryPosition, IntegrityReport, Iter, NodeInfo, NodeType, RTree,
    SearchResults,
};
