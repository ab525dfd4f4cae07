//! A generic in-memory R*-tree.
//!
//! The tree is a height-balanced, multi-way spatial index over axis-aligned
//! bounding boxes in `D` dimensions, parameterised by a numeric coordinate
//! type `K`, a stored value type `V`, and a [`Capacity`] describing the
//! fan-out bounds. Insertion follows the R*-tree descent rules (minimum
//! overlap increase near the leaves, minimum area enlargement above them),
//! node overflow triggers an R*-style two-phase split, and node underflow on
//! erase dissolves the leaf and re-inserts its surviving entries.

mod integrity;
mod node;
mod search;
mod split;

pub use integrity::{CheckMode, IntegrityReport};
pub use node::NodeType;
pub use search::{Entry, EntryPosition, Iter, NodeInfo, SearchResults};

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use crate::bounding_box::BoundingBox;
use crate::capacity::{self, Capacity, DefaultCapacity};
use crate::errors::{TreeError, TreeResult};
use crate::geometry;
use crate::point::{Coordinate, Point};

use node::{NodePayload, NodeStore};

/// A generic R*-tree over axis-aligned bounding boxes in `D` dimensions.
///
/// Values are moved into the tree on insert and dropped with it. Searching
/// borrows the tree; the positions handed out by a search are invalidated by
/// the next mutation and are re-validated cheaply on use.
///
/// # Examples
///
/// ```rust
/// use boxtree::{Point, RTree};
///
/// let mut tree: RTree<f64, &str, 2> = RTree::new().unwrap();
/// tree.insert(Point::new([0.0, 0.0]), Point::new([15.0, 20.0]), "first")?;
/// tree.insert_at(Point::new([5.0, 6.0]), "second")?;
///
/// let hits = tree.search(&Point::new([6.0, 6.0]));
/// assert_eq!(hits.len(), 1);
/// assert_eq!(*hits.iter().next().unwrap().value(), "first");
/// # Ok::<(), boxtree::TreeError>(())
/// ```
pub struct RTree<K, V, const D: usize, C: Capacity = DefaultCapacity> {
    /// The root cell is boxed so that moving the tree value does not move the
    /// cell the root's children point back to.
    root: Box<NodeStore<K, V, D>>,
    len: usize,
    /// Bumped by every mutating call; search positions carry the epoch they
    /// were minted under and are rejected when it no longer matches.
    epoch: u64,
    _capacity: PhantomData<C>,
}

// The tree exclusively owns every node it points at and has no interior
// mutability; the raw parent pointers never escape a single call.
unsafe impl<K: Send, V: Send, const D: usize, C: Capacity> Send for RTree<K, V, D, C> {}
unsafe impl<K: Sync, V: Sync, const D: usize, C: Capacity> Sync for RTree<K, V, D, C> {}

impl<K: Coordinate, V, const D: usize, C: Capacity> RTree<K, V, D, C> {
    /// Creates an empty tree whose root is an empty leaf directory.
    ///
    /// Fails with [`TreeError::InvalidCapacity`] when the capacity parameters
    /// are inconsistent (in particular when `MIN_FANOUT > MAX_FANOUT / 2`).
    pub fn new() -> TreeResult<Self> {
        capacity::validate::<C>(D)?;

        Ok(Self {
            root: Box::new(NodeStore::new_leaf_directory()),
            len: 0,
            epoch: 0,
            _capacity: PhantomData,
        })
    }

    /// Inserts a value covering the box spanned by `start` and `end`.
    ///
    /// Fails with [`TreeError::TreeTooDeep`] when the insertion descent
    /// exhausts the configured depth limit; the tree is left unchanged in
    /// that case.
    pub fn insert(&mut self, start: Point<K, D>, end: Point<K, D>, value: V) -> TreeResult<()> {
        let extent = BoundingBox::new(start, end);
        log::trace!("insert: extent={}", extent);

        self.epoch += 1;
        self.insert_node(NodeStore::new_value(extent, value))?;
        self.len += 1;
        Ok(())
    }

    /// Inserts a value at a single point (a degenerate box with
    /// `start == end`).
    pub fn insert_at(&mut self, position: Point<K, D>, value: V) -> TreeResult<()> {
        self.insert(position, position, value)
    }

    /// Removes the value at a position obtained from a prior
    /// [`search`](Self::search).
    ///
    /// Fails with [`TreeError::StaleHandle`] when the tree has been mutated
    /// since the search; the tree is unchanged in that case. A leaf left
    /// below the minimum fan-out by the removal is dissolved and its
    /// survivors re-inserted; an ancestor that underflows in turn is
    /// dissolved the same way, with every value node in its subtree buffered
    /// and re-inserted.
    pub fn erase(&mut self, pos: EntryPosition<K, V, D>) -> TreeResult<()> {
        if pos.epoch != self.epoch {
            return Err(TreeError::StaleHandle);
        }

        let value_ptr = pos.node.as_ptr();
        // Safety: the epoch matches, so no mutation has happened since the
        // search that produced this position and the node cell is live.
        let (leaf_ptr, erased_extent) = unsafe {
            let vn = &*value_ptr;
            if vn.node_type != NodeType::Value || vn.parent.is_null() {
                return Err(TreeError::StaleHandle);
            }
            (vn.parent, vn.extent)
        };

        // Safety: a value node's parent is its enclosing leaf directory and
        // back-references are valid between public calls.
        let leaf = unsafe { &mut *leaf_ptr };

        let dir = leaf.directory_mut().ok_or(TreeError::UnknownNodeType)?;
        let idx = dir
            .children
            .iter()
            .position(|c| ptr::eq(c, value_ptr))
            .ok_or(TreeError::StaleHandle)?;

        self.epoch += 1;

        dir.children.remove(idx);
        leaf.count -= 1;
        // Surviving siblings shifted inside the leaf's buffer.
        leaf.valid_back_refs = false;
        self.len -= 1;

        if leaf.is_root() || leaf.count >= C::MIN_FANOUT {
            Self::shrink_tree_upward(leaf_ptr, &erased_extent);
            return Ok(());
        }

        // The leaf underflowed: dissolve it, cascading into ancestors that
        // underflow in turn, then re-insert every buffered value.
        log::debug!("erase: dissolving underfull leaf, {} survivor(s)", leaf.count);

        let mut orphans: Vec<NodeStore<K, V, D>> = Vec::new();
        let mut child_ptr = leaf_ptr;
        loop {
            // Safety: the dissolving node is not the root, so its parent
            // pointer is a live cell.
            let parent_ptr = unsafe { (*child_ptr).parent };
            let parent = unsafe { &mut *parent_ptr };

            let pdir = parent.directory_mut().ok_or(TreeError::UnknownNodeType)?;
            let idx = pdir
                .children
                .iter()
                .position(|c| ptr::eq(c, child_ptr))
                .ok_or(TreeError::UnknownNodeType)?;
            let dissolved = pdir.children.remove(idx);
            parent.count -= 1;
            collect_value_nodes(dissolved, &mut orphans);

            // Removing an element shifted the parent's surviving children.
            parent.mark_children_moved();
            parent.rewalk_back_refs();
            if parent.repack() {
                parent.repack_upward();
            }

            if parent.is_root() {
                // A non-leaf root left with no children reverts to an empty
                // leaf directory.
                if parent.count == 0 {
                    parent.node_type = NodeType::DirectoryLeaf;
                }
                break;
            }

            if parent.count >= C::MIN_FANOUT {
                break;
            }

            // The parent underflowed as well; dissolve it next.
            log::debug!(
                "erase: ancestor underflowed to {} child(ren), dissolving",
                parent.count
            );
            child_ptr = parent_ptr;
        }

        for orphan in orphans.into_iter().rev() {
            self.insert_node(orphan)?;
        }

        Ok(())
    }

    /// Whether the tree stores no values.
    pub fn empty(&self) -> bool {
        self.root.count == 0
    }

    /// Number of values stored in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Alias of [`empty`](Self::empty), for parity with the standard
    /// collections.
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    /// The tight bounding box of everything stored in the tree. The default
    /// (all-zero) box when the tree is empty.
    pub fn extent(&self) -> BoundingBox<K, D> {
        self.root.extent
    }

    /// Number of directory levels, following the leftmost path. An empty
    /// tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node: &NodeStore<K, V, D> = &self.root;

        while node.node_type == NodeType::DirectoryNonleaf {
            match node.directory().and_then(|dir| dir.children.first()) {
                Some(child) => {
                    node = child;
                    height += 1;
                }
                None => break,
            }
        }

        height
    }

    /// Wraps a prepared value cell and links it into the tree.
    fn insert_node(&mut self, mut ns: NodeStore<K, V, D>) -> TreeResult<()> {
        let ns_extent = ns.extent;
        let leaf_ptr = self.choose_insertion_node(&ns_extent)?;
        // Safety: the pointer was just produced by the descent and nothing
        // has moved since.
        let leaf = unsafe { &mut *leaf_ptr };

        ns.parent = leaf_ptr;
        let dir = leaf.directory_mut().ok_or(TreeError::UnknownNodeType)?;
        dir.children.push(ns);
        leaf.count += 1;

        if leaf.count > C::MAX_FANOUT {
            return self.split_node(leaf_ptr);
        }

        if leaf.count == 1 {
            leaf.extent = ns_extent;
        } else {
            geometry::enlarge_to_fit(&mut leaf.extent, &ns_extent);
        }

        log::trace!("insert: leaf count={}; extent={}", leaf.count, leaf.extent);

        // Propagate the enlargement up to the root.
        let leaf_extent = leaf.extent;
        let mut p = leaf.parent;
        while !p.is_null() {
            // Safety: ancestors on the path to the root hold valid parent
            // chains between public calls.
            let ancestor = unsafe { &mut *p };
            geometry::enlarge_to_fit(&mut ancestor.extent, &leaf_extent);
            p = ancestor.parent;
        }

        Ok(())
    }

    /// Descends from the root to the leaf directory that should receive a
    /// box. At levels that contain leaf directories, candidates are ranked
    /// by overlap increase, then area enlargement, then area; above them, by
    /// area enlargement, then area.
    fn choose_insertion_node(
        &mut self,
        bb: &BoundingBox<K, D>,
    ) -> TreeResult<*mut NodeStore<K, V, D>> {
        let mut dst: *mut NodeStore<K, V, D> = &mut *self.root;

        for _ in 0..C::MAX_TREE_DEPTH {
            // Safety: dst always points at a live cell of this tree.
            let node = unsafe { &mut *dst };

            match node.node_type {
                NodeType::DirectoryLeaf => return Ok(dst),
                NodeType::DirectoryNonleaf => {}
                _ => return Err(TreeError::UnknownNodeType),
            }

            let dir = node.directory_mut().ok_or(TreeError::UnknownNodeType)?;
            let has_leaf_dir = dir
                .children
                .iter()
                .any(|c| c.node_type == NodeType::DirectoryLeaf);

            let mut best: Option<(*mut NodeStore<K, V, D>, ChoiceCost<K>)> = None;
            for child in dir.children.iter_mut() {
                let cost = ChoiceCost {
                    overlap: if has_leaf_dir {
                        overlap_cost(bb, child)
                    } else {
                        K::default()
                    },
                    enlargement: geometry::area_enlargement(&child.extent, bb),
                    area: geometry::area(&child.extent),
                };

                let better = match &best {
                    Some((_, best_cost)) => cost.beats(best_cost),
                    None => true,
                };
                if better {
                    best = Some((child as *mut _, cost));
                }
            }

            match best {
                Some((child, _)) => dst = child,
                // A non-leaf directory with no children cannot occur in a
                // well-formed tree.
                None => return Err(TreeError::UnknownNodeType),
            }
        }

        Err(TreeError::TreeTooDeep(C::MAX_TREE_DEPTH))
    }

    /// After a child of `ns` shrank or disappeared, repacks the extents along
    /// the path to the root for as long as they actually change. Only nodes
    /// whose extent the affected box may have been defining (it touches the
    /// outer envelope) are repacked.
    fn shrink_tree_upward(ns: *mut NodeStore<K, V, D>, affected: &BoundingBox<K, D>) {
        if ns.is_null() {
            return;
        }

        // Safety: caller passes a live cell; parents on the root path are
        // valid between public calls.
        let node = unsafe { &mut *ns };

        if !node.extent.contains_at_boundary(affected) {
            return;
        }

        let original = node.extent;
        if !node.repack() {
            return;
        }

        Self::shrink_tree_upward(node.parent, &original);
    }
}

impl<K, V, const D: usize, C: Capacity> fmt::Debug for RTree<K, V, D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("len", &self.len)
            .field("epoch", &self.epoch)
            .field("min_fanout", &C::MIN_FANOUT)
            .field("max_fanout", &C::MAX_FANOUT)
            .finish_non_exhaustive()
    }
}

/// Ranking key of an insertion candidate. Comparison is strictly
/// prioritised: overlap increase first, then area enlargement, then area.
#[derive(Clone, Copy)]
struct ChoiceCost<K> {
    overlap: K,
    enlargement: K,
    area: K,
}

impl<K: Coordinate> ChoiceCost<K> {
    fn beats(&self, other: &ChoiceCost<K>) -> bool {
        match self.overlap.partial_cmp(&other.overlap) {
            Some(Ordering::Less) => return true,
            Some(Ordering::Greater) => return false,
            _ => {}
        }

        match self.enlargement.partial_cmp(&other.enlargement) {
            Some(Ordering::Less) => return true,
            Some(Ordering::Greater) => return false,
            _ => {}
        }

        matches!(self.area.partial_cmp(&other.area), Some(Ordering::Less))
    }
}

/// Drains every value node out of a detached subtree into `orphans`, in
/// encounter order, dropping the dissolved directory shells. Each buffered
/// value comes back as a fresh unlinked cell ready for re-insertion.
fn collect_value_nodes<K: Coordinate, V, const D: usize>(
    ns: NodeStore<K, V, D>,
    orphans: &mut Vec<NodeStore<K, V, D>>,
) {
    let extent = ns.extent;
    match ns.payload {
        NodePayload::Value(v) => orphans.push(NodeStore::new_value(extent, v.value)),
        NodePayload::Directory(dir) => {
            for child in dir.children {
                collect_value_nodes(child, orphans);
            }
        }
    }
}

/// Overlap cost of placing `bb` into the candidate directory: the summed
/// intersection volume of `bb` with each of the candidate's current
/// children.
fn overlap_cost<K: Coordinate, V, const D: usize>(
    bb: &BoundingBox<K, D>,
    candidate: &NodeStore<K, V, D>,
) -> K {
    let mut cost = K::default();

    if let NodePayload::Directory(dir) = &candidate.payload {
        for child in &dir.children {
            cost = cost + geometry::intersection(&child.extent, bb);
        }
    }

    cost
}
