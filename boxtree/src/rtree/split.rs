//! R*-style node splitting.
//!
//! Splitting an overfull directory happens in two phases, per Beckmann et
//! al.: first the split axis is chosen as the dimension with the minimum sum
//! of half-margins over all candidate distributions, then the distribution
//! along that axis with the minimum overlap between the two groups is
//! picked. Group 2 moves into a fresh sibling node; the split propagates
//! upward and can cascade all the way to the root.

use std::cmp::Ordering;

use crate::bounding_box::BoundingBox;
use crate::capacity::{distribution_count, Capacity};
use crate::errors::{TreeError, TreeResult};
use crate::geometry;
use crate::point::Coordinate;

use super::node::{NodeStore, NodeType};
use super::RTree;

impl<K: Coordinate, V, const D: usize, C: Capacity> RTree<K, V, D, C> {
    /// Splits an overfull directory node holding `MAX_FANOUT + 1` children
    /// and propagates the change upward, splitting ancestors as needed.
    pub(crate) fn split_node(&mut self, ns_ptr: *mut NodeStore<K, V, D>) -> TreeResult<()> {
        // Safety: ns_ptr points at a live directory cell of this tree; the
        // borrow ends before the parent (which owns the cell) is touched.
        let ns = unsafe { &mut *ns_ptr };

        let ns_type = ns.node_type;
        let split_is_root = ns.is_root();
        let parent_ptr = ns.parent;

        let mut sibling = match ns_type {
            NodeType::DirectoryLeaf => NodeStore::new_leaf_directory(),
            NodeType::DirectoryNonleaf => NodeStore::new_nonleaf_directory(),
            _ => return Err(TreeError::UnknownNodeType),
        };

        {
            let dir = ns.directory_mut().ok_or(TreeError::UnknownNodeType)?;
            debug_assert_eq!(dir.children.len(), C::MAX_FANOUT + 1);

            sort_by_split_axis::<K, V, D, C>(&mut dir.children);
            let dist = pick_distribution::<K, V, D, C>(&dir.children);
            let group1_size = C::MIN_FANOUT - 1 + dist;
            log::trace!("split: distribution {} picked, group 1 keeps {}", dist, group1_size);

            // Group 2 moves into the sibling; the original node keeps group 1.
            let group2 = dir.children.split_off(group1_size);
            sibling.count = group2.len();
            match sibling.directory_mut() {
                Some(sdir) => sdir.children = group2,
                None => return Err(TreeError::UnknownNodeType),
            }
        }

        sibling.repack();
        ns.count = match ns.directory() {
            Some(dir) => dir.children.len(),
            None => return Err(TreeError::UnknownNodeType),
        };
        ns.repack();

        if split_is_root {
            // Swap a fresh non-leaf root into place and hang the original
            // root and the new sibling beneath it.
            let mut group1 = NodeStore::new_nonleaf_directory();
            std::mem::swap(&mut *self.root, &mut group1);

            let root_ptr: *mut NodeStore<K, V, D> = &mut *self.root;
            group1.parent = root_ptr;
            sibling.parent = root_ptr;

            let root_dir = self.root.directory_mut().ok_or(TreeError::UnknownNodeType)?;
            root_dir.children.push(group1);
            root_dir.children.push(sibling);
            self.root.count = 2;
            self.root.repack();

            // Both children just moved into the new root's buffer.
            self.root.mark_children_moved();
            self.root.rewalk_back_refs();

            return Ok(());
        }

        // Hang the sibling under the same parent as the split node.
        sibling.parent = parent_ptr;
        // Safety: the split node is not the root, so its parent pointer is a
        // live cell; the borrow of the split node itself is over.
        let parent = unsafe { &mut *parent_ptr };

        match parent.directory_mut() {
            Some(pdir) => pdir.children.push(sibling),
            None => return Err(TreeError::UnknownNodeType),
        }
        parent.count += 1;
        let parent_extent_changed = parent.repack();

        // The push may have reallocated the parent's child buffer and moved
        // every sibling, so the whole subtree below the parent is re-walked.
        parent.mark_children_moved();
        parent.rewalk_back_refs();

        if parent.count > C::MAX_FANOUT {
            // The parent is now overfull as well; keep splitting upward.
            return self.split_node(parent_ptr);
        }

        if parent_extent_changed {
            parent.repack_upward();
        }

        Ok(())
    }
}

/// First-seen-wins minimum tracker for axis and distribution selection.
struct MinTracker<K> {
    value: K,
    pos: usize,
    seen: usize,
}

impl<K: Coordinate> MinTracker<K> {
    fn new() -> Self {
        Self {
            value: K::default(),
            pos: 0,
            seen: 0,
        }
    }

    fn observe(&mut self, value: K, pos: usize) {
        if self.seen == 0 || matches!(value.partial_cmp(&self.value), Some(Ordering::Less)) {
            self.value = value;
            self.pos = pos;
        }

        self.seen += 1;
    }

    fn pos(&self) -> usize {
        self.pos
    }
}

/// Sorts the children stably by `(start, end)` along `dim` and marks them
/// moved.
fn sort_by_dimension<K: Coordinate, V, const D: usize>(
    dim: usize,
    children: &mut [NodeStore<K, V, D>],
) {
    children.sort_by(|a, b| {
        a.extent.start[dim]
            .partial_cmp(&b.extent.start[dim])
            .unwrap_or(Ordering::Equal)
            .then(
                a.extent.end[dim]
                    .partial_cmp(&b.extent.end[dim])
                    .unwrap_or(Ordering::Equal),
            )
    });

    for child in children.iter_mut() {
        child.valid_back_refs = false;
    }
}

/// Bounding boxes of the two groups induced by distribution `dist`.
fn group_boxes<K: Coordinate, V, const D: usize, C: Capacity>(
    dist: usize,
    children: &[NodeStore<K, V, D>],
) -> Option<(BoundingBox<K, D>, BoundingBox<K, D>)> {
    let group1_size = C::MIN_FANOUT - 1 + dist;
    let (group1, group2) = children.split_at(group1_size);

    let bb1 = geometry::bounding_box_of(group1.iter().map(|c| &c.extent))?;
    let bb2 = geometry::bounding_box_of(group2.iter().map(|c| &c.extent))?;
    Some((bb1, bb2))
}

/// Chooses the split axis as the dimension with the minimum sum of group
/// half-margins over all distributions, and leaves the children sorted along
/// it. Ties go to the lowest dimension index.
fn sort_by_split_axis<K: Coordinate, V, const D: usize, C: Capacity>(
    children: &mut [NodeStore<K, V, D>],
) {
    let mut min_margin = MinTracker::new();

    for dim in 0..D {
        sort_by_dimension(dim, children);

        let mut sum_of_margins = K::default();
        for dist in 1..=distribution_count::<C>() {
            if let Some((bb1, bb2)) = group_boxes::<K, V, D, C>(dist, children) {
                sum_of_margins =
                    sum_of_margins + geometry::half_margin(&bb1) + geometry::half_margin(&bb2);
            }
        }

        log::trace!("split: dim={}; sum of margins={}", dim, sum_of_margins);
        min_margin.observe(sum_of_margins, dim);
    }

    let axis = min_margin.pos();
    log::trace!("split: axis {} picked", axis);
    sort_by_dimension(axis, children);
}

/// Along the chosen axis, picks the distribution with the minimum overlap
/// between the two group bounding boxes. Ties go to the first distribution.
fn pick_distribution<K: Coordinate, V, const D: usize, C: Capacity>(
    children: &[NodeStore<K, V, D>],
) -> usize {
    let mut min_overlap = MinTracker::new();

    for dist in 1..=distribution_count::<C>() {
        if let Some((bb1, bb2)) = group_boxes::<K, V, D, C>(dist, children) {
            let overlap = geometry::intersection(&bb1, &bb2);
            log::trace!("split: dist={}; overlap={}", dist, overlap);
            min_overlap.observe(overlap, dist);
        }
    }

    min_overlap.pos()
}
