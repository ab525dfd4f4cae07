//! Split behavior of overfull directory nodes.

use boxtree::{Capacity, CheckMode, DefaultCapacity, NodeType, Point, RTree};

const MAX: usize = DefaultCapacity::MAX_FANOUT;

/// Collects `(start, end)` y-extents of every leaf directory.
fn leaf_y_ranges<V>(tree: &RTree<i64, V, 2>) -> Vec<(i64, i64)> {
    let mut ranges = Vec::new();
    tree.walk(|info| {
        if info.node_type == NodeType::DirectoryLeaf {
            ranges.push((info.extent.start[1], info.extent.end[1]));
        }
    });
    ranges
}

#[test]
fn test_overflow_splits_into_two_leaves() {
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();

    // MAX_FANOUT + 1 rectangles: all share start.x = 0 with varying widths,
    // stacked along y with a gap. Grouping along y keeps both halves tight,
    // so the split axis must be y.
    for i in 0..=MAX {
        let y = i as i64 * 3;
        let w = (i as i64 * 7) % 13 + 1;
        tree.insert(Point::new([0, y]), Point::new([w, y + 2]), i)
            .unwrap();
    }

    tree.check_integrity(CheckMode::Silent).unwrap();
    assert_eq!(tree.height(), 2);

    let ranges = leaf_y_ranges(&tree);
    assert_eq!(ranges.len(), 2);

    // Each leaf covers a contiguous y-range and the two ranges are disjoint,
    // which is only possible if the children were partitioned along y.
    let (first, second) = if ranges[0].0 < ranges[1].0 {
        (ranges[0], ranges[1])
    } else {
        (ranges[1], ranges[0])
    };
    assert!(first.1 < second.0);
    assert_eq!(first.0, 0);
    assert_eq!(second.1, MAX as i64 * 3 + 2);

    // Every rectangle falls wholly into one of the two y-ranges.
    for i in 0..=MAX {
        let y = i as i64 * 3;
        let in_first = y >= first.0 && y + 2 <= first.1;
        let in_second = y >= second.0 && y + 2 <= second.1;
        assert!(in_first ^ in_second);
    }
}

#[test]
fn test_split_respects_fanout_bounds() {
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();
    for i in 0..=MAX {
        let y = i as i64 * 3;
        tree.insert(Point::new([0, y]), Point::new([5, y + 2]), i)
            .unwrap();
    }

    // After the split, both leaves hold between MIN and MAX children; the
    // silent check verifies that along with everything else.
    tree.check_integrity(CheckMode::Silent).unwrap();

    let mut leaf_counts = 0;
    tree.walk(|info| {
        if info.node_type == NodeType::DirectoryLeaf {
            leaf_counts += 1;
        }
    });
    assert_eq!(leaf_counts, 2);
    assert_eq!(tree.len(), MAX + 1);
}

#[test]
fn test_cascading_splits_keep_invariants() {
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();

    // Enough disjoint squares to split leaves repeatedly and eventually the
    // root's children as well.
    for i in 0..600 {
        let c = i as i64 * 2;
        tree.insert(Point::new([c, c]), Point::new([c + 1, c + 1]), i)
            .unwrap();
    }

    tree.check_integrity(CheckMode::Silent).unwrap();
    assert_eq!(tree.len(), 600);
    assert!(tree.height() >= 2);

    // Every value is still reachable after all the restructuring.
    for i in [0usize, 299, 599] {
        let c = i as i64 * 2;
        let hits = tree.search(&Point::new([c, c]));
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits.iter().next().unwrap().value(), i);
    }
}

#[test]
fn test_search_after_root_split_finds_everything() {
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();
    for i in 0..=MAX {
        let y = i as i64 * 3;
        tree.insert(Point::new([0, y]), Point::new([5, y + 2]), i)
            .unwrap();
    }

    for i in 0..=MAX {
        let y = i as i64 * 3;
        let hits = tree.search(&Point::new([1, y + 1]));
        assert_eq!(hits.len(), 1, "rectangle {} lost after split", i);
        assert_eq!(*hits.iter().next().unwrap().value(), i);
    }
}
