//! Erase behavior: extent shrinking, leaf dissolution, and failure modes.

use boxtree::{CheckMode, Point, RTree, TreeError};
use boxtree_int_test::test_util::{build_grid_tree, grid_point, values_at};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Erases the single hit at `pt`, if any.
fn erase_at(tree: &mut RTree<i64, usize, 2>, pt: &Point<i64, 2>) -> Result<bool, TreeError> {
    let pos = {
        let hits = tree.search(pt);
        hits.iter().next().map(|e| e.position())
    };

    match pos {
        Some(pos) => tree.erase(pos).map(|_| true),
        None => Ok(false),
    }
}

#[test]
fn test_erase_from_grid_keeps_the_rest() {
    let mut tree = build_grid_tree(200).unwrap();

    assert!(erase_at(&mut tree, &grid_point(50)).unwrap());

    assert!(values_at(&tree, &grid_point(50)).is_empty());
    assert_eq!(tree.len(), 199);
    tree.check_integrity(CheckMode::Silent).unwrap();

    // Every other square is still findable.
    for i in (0..200).filter(|&i| i != 50) {
        assert_eq!(
            values_at(&tree, &grid_point(i)),
            vec![i],
            "square {} lost after erase",
            i
        );
    }
}

#[test]
fn test_erase_shrinks_extent_at_the_envelope() {
    let mut tree = build_grid_tree(50).unwrap();
    let before = tree.extent();

    // The last square defines the upper corner of the root extent; erasing
    // it must shrink the envelope.
    assert!(erase_at(&mut tree, &grid_point(49)).unwrap());
    let after = tree.extent();
    assert_ne!(before, after);
    assert!(before.contains(&after));
    // Square 48 now defines the upper corner.
    assert_eq!(after.end, Point::new([97, 97]));

    tree.check_integrity(CheckMode::Silent).unwrap();
}

#[test]
fn test_insert_then_erase_restores_search_results() {
    // Small enough that the root stays a leaf and the erase cannot cascade.
    let mut tree = build_grid_tree(50).unwrap();

    let probes: Vec<Point<i64, 2>> = (0..50).map(grid_point).collect();
    let before: Vec<Vec<usize>> = probes.iter().map(|p| values_at(&tree, p)).collect();

    // A temporary value covering the whole diagonal band.
    tree.insert(Point::new([0, 0]), Point::new([99, 99]), 999)
        .unwrap();
    assert!(erase_at(&mut tree, &Point::new([1, 2])).unwrap());

    let after: Vec<Vec<usize>> = probes.iter().map(|p| values_at(&tree, p)).collect();
    assert_eq!(before, after);
    assert_eq!(tree.len(), 50);
    tree.check_integrity(CheckMode::Silent).unwrap();
}

#[test]
fn test_erase_with_stale_position_fails() {
    let mut tree = build_grid_tree(10).unwrap();

    let pos = {
        let hits = tree.search(&grid_point(3));
        hits.iter().next().map(|e| e.position()).unwrap()
    };

    // Any mutation invalidates the position.
    tree.insert(Point::new([500, 500]), Point::new([501, 501]), 1000)
        .unwrap();
    assert!(matches!(tree.erase(pos), Err(TreeError::StaleHandle)));
    assert_eq!(tree.len(), 11);
}

#[test]
fn test_random_erase_preserves_invariants() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut tree = build_grid_tree(300).unwrap();
    let mut live: Vec<bool> = vec![true; 300];

    for _ in 0..120 {
        let i = rng.gen_range(0..300);
        if !live[i] {
            assert!(values_at(&tree, &grid_point(i)).is_empty());
            continue;
        }

        // Underflowing leaves (and ancestors) are repaired by dissolution
        // and re-insertion, so every erase of a live square must succeed.
        assert!(
            erase_at(&mut tree, &grid_point(i)).unwrap(),
            "live square {} not found",
            i
        );
        live[i] = false;
        assert!(values_at(&tree, &grid_point(i)).is_empty());

        tree.check_integrity(CheckMode::Silent).unwrap();
    }

    let expected_len = live.iter().filter(|&&l| l).count();
    assert_eq!(tree.len(), expected_len);

    for (i, &l) in live.iter().enumerate() {
        let found = values_at(&tree, &grid_point(i));
        if l {
            assert_eq!(found, vec![i]);
        } else {
            assert!(found.is_empty());
        }
    }
}
