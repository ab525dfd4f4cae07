//! Node storage for the R-tree.
//!
//! Every node in the tree is held in a uniform [`NodeStore`] cell: a type
//! tag, the tight extent of the subtree, a raw back-reference to the parent
//! cell, and a payload that is either a directory of child cells or a stored
//! value. Children are owned by value inside their directory's `Vec`, so any
//! reorder or reallocation of that `Vec` moves nodes and leaves the `parent`
//! fields of the moved nodes' children dangling. The `valid_back_refs` flag
//! records exactly that condition; owners re-walk their subtree with
//! [`NodeStore::reset_child_parents`] before any step that dereferences a
//! `parent` field.

use std::fmt;
use std::ptr;

use crate::bounding_box::BoundingBox;
use crate::geometry;
use crate::point::Coordinate;

/// The role of a node within the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A directory whose children are value nodes.
    DirectoryLeaf,
    /// A directory whose children are directories.
    DirectoryNonleaf,
    /// A stored value and its bounding box.
    Value,
    /// Not a valid tree node. Never present in a well-formed tree.
    Unspecified,
}

impl NodeType {
    /// Whether this tag denotes a directory node.
    pub fn is_directory(&self) -> bool {
        matches!(self, NodeType::DirectoryLeaf | NodeType::DirectoryNonleaf)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            NodeType::DirectoryLeaf => "directory-leaf",
            NodeType::DirectoryNonleaf => "directory-nonleaf",
            NodeType::Value => "value",
            NodeType::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload owned by a [`NodeStore`], selected by its type tag.
pub(crate) enum NodePayload<K, V, const D: usize> {
    Directory(DirectoryNode<K, V, D>),
    Value(ValueNode<V>),
}

/// An ordered collection of child node cells.
pub(crate) struct DirectoryNode<K, V, const D: usize> {
    pub(crate) children: Vec<NodeStore<K, V, D>>,
}

impl<K: Coordinate, V, const D: usize> DirectoryNode<K, V, D> {
    pub(crate) fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// The tight enclosing box of the children, or `None` when there are no
    /// children.
    pub(crate) fn calc_extent(&self) -> Option<BoundingBox<K, D>> {
        geometry::bounding_box_of(self.children.iter().map(|c| &c.extent))
    }
}

/// An opaque carrier for a stored value.
pub(crate) struct ValueNode<V> {
    pub(crate) value: V,
}

/// A uniform node cell.
///
/// `parent` is null iff this cell is the tree's root. `count` mirrors the
/// directory's child count and is zero for value nodes. `valid_back_refs`
/// is false whenever this cell may have moved in memory, which makes the
/// `parent` fields stored in its children suspect.
pub(crate) struct NodeStore<K, V, const D: usize> {
    pub(crate) node_type: NodeType,
    pub(crate) extent: BoundingBox<K, D>,
    pub(crate) parent: *mut NodeStore<K, V, D>,
    pub(crate) count: usize,
    pub(crate) valid_back_refs: bool,
    pub(crate) payload: NodePayload<K, V, D>,
}

impl<K: Coordinate, V, const D: usize> NodeStore<K, V, D> {
    /// Creates an empty leaf directory cell.
    pub(crate) fn new_leaf_directory() -> Self {
        Self {
            node_type: NodeType::DirectoryLeaf,
            extent: BoundingBox::default(),
            parent: ptr::null_mut(),
            count: 0,
            valid_back_refs: false,
            payload: NodePayload::Directory(DirectoryNode::new()),
        }
    }

    /// Creates an empty non-leaf directory cell.
    pub(crate) fn new_nonleaf_directory() -> Self {
        Self {
            node_type: NodeType::DirectoryNonleaf,
            extent: BoundingBox::default(),
            parent: ptr::null_mut(),
            count: 0,
            valid_back_refs: false,
            payload: NodePayload::Directory(DirectoryNode::new()),
        }
    }

    /// Creates a value cell covering `extent`.
    pub(crate) fn new_value(extent: BoundingBox<K, D>, value: V) -> Self {
        Self {
            node_type: NodeType::Value,
            extent,
            parent: ptr::null_mut(),
            count: 0,
            valid_back_refs: true,
            payload: NodePayload::Value(ValueNode { value }),
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_null()
    }

    pub(crate) fn directory(&self) -> Option<&DirectoryNode<K, V, D>> {
        match &self.payload {
            NodePayload::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn directory_mut(&mut self) -> Option<&mut DirectoryNode<K, V, D>> {
        match &mut self.payload {
            NodePayload::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn value(&self) -> Option<&V> {
        match &self.payload {
            NodePayload::Value(v) => Some(&v.value),
            _ => None,
        }
    }

    /// Recomputes this directory's extent from its children. Returns whether
    /// the extent changed. A directory with no children gets the default
    /// (all-zero) box; value cells are left untouched.
    pub(crate) fn repack(&mut self) -> bool {
        let new_extent = match &self.payload {
            NodePayload::Directory(dir) => dir.calc_extent().unwrap_or_default(),
            _ => return false,
        };

        let changed = new_extent != self.extent;
        self.extent = new_extent;
        changed
    }

    /// Repacks each ancestor in turn, stopping at the first one whose extent
    /// does not change.
    ///
    /// The caller must have re-established the parent chain above this cell
    /// before invoking this.
    pub(crate) fn repack_upward(&mut self) {
        let mut p = self.parent;
        while !p.is_null() {
            // Safety: back-references on the path to the root are valid per
            // the caller contract, and the tree is not otherwise aliased
            // during a mutation.
            let node = unsafe { &mut *p };
            if !node.repack() {
                break;
            }

            p = node.parent;
        }
    }

    /// Marks every direct child as possibly moved. Called after this cell's
    /// child `Vec` has been sorted, compacted, or reallocated.
    pub(crate) fn mark_children_moved(&mut self) {
        if let NodePayload::Directory(dir) = &mut self.payload {
            for child in &mut dir.children {
                child.valid_back_refs = false;
            }
        }
    }

    /// Re-establishes `parent` fields throughout the stale part of this
    /// subtree, then marks this cell valid again. A cell whose flag is
    /// already valid is skipped together with its subtree; this is the sole
    /// mechanism that keeps the back-reference graph consistent across
    /// container mutations.
    pub(crate) fn reset_child_parents(&mut self) {
        if self.valid_back_refs {
            return;
        }

        let self_ptr: *mut Self = self;
        if let NodePayload::Directory(dir) = &mut self.payload {
            for child in &mut dir.children {
                child.parent = self_ptr;
                child.reset_child_parents();
            }
        }

        self.valid_back_refs = true;
    }

    /// Clears the valid flag and re-walks the subtree unconditionally.
    pub(crate) fn rewalk_back_refs(&mut self) {
        self.valid_back_refs = false;
        self.reset_child_parents();
    }
}
