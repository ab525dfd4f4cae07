//! Sustained grid workload: integrity after every step.

use boxtree::{CheckMode, Point, RTree};
use boxtree_int_test::test_util::{build_grid_tree, grid_point, insert_grid_squares, values_at};

#[test]
fn test_grid_insert_with_integrity_after_every_step() {
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();

    for i in 0..200 {
        insert_grid_squares(&mut tree, i..i + 1).unwrap();
        tree.check_integrity(CheckMode::Silent).unwrap();
    }

    assert_eq!(tree.len(), 200);
    assert!(tree.height() <= 3);
}

#[test]
fn test_grid_search_hits_exactly_one_square() {
    let tree = build_grid_tree(200).unwrap();

    // The squares are pairwise disjoint, so each corner matches one value.
    assert_eq!(values_at(&tree, &grid_point(100)), vec![100]);
    assert_eq!(values_at(&tree, &grid_point(0)), vec![0]);
    assert_eq!(values_at(&tree, &grid_point(199)), vec![199]);

    // An off-diagonal point between two squares matches nothing.
    let gap = Point::new([1, 2]);
    assert!(values_at(&tree, &gap).is_empty());
}

#[test]
fn test_grid_workload_full_sweep() {
    let tree = build_grid_tree(200).unwrap();

    for i in 0..200 {
        assert_eq!(
            values_at(&tree, &grid_point(i)),
            vec![i],
            "square {} not found",
            i
        );
    }
}

#[test]
fn test_walk_covers_all_values() {
    let tree = build_grid_tree(200).unwrap();

    let mut value_nodes = 0;
    tree.walk(|info| {
        if info.node_type == boxtree::NodeType::Value {
            value_nodes += 1;
        }
    });
    assert_eq!(value_nodes, 200);
}
