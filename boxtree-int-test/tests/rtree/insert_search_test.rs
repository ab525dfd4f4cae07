//! Insertion and point-containment search against the full public surface.

use boxtree::{BoundingBox, Point, RTree, TreeError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sample_tree() -> RTree<i64, &'static str, 2> {
    let mut tree = RTree::new().unwrap();
    tree.insert(Point::new([0, 0]), Point::new([15, 20]), "a")
        .unwrap();
    tree.insert(Point::new([-2, -1]), Point::new([1, 2]), "b")
        .unwrap();
    tree.insert(Point::new([-1, -1]), Point::new([1, 3]), "c")
        .unwrap();
    tree.insert(Point::new([5, 6]), Point::new([5, 6]), "d")
        .unwrap();
    tree
}

#[test]
fn test_search_returns_exactly_the_covering_values() {
    let tree = sample_tree();

    let hits = tree.search(&Point::new([6, 6]));
    let mut values: Vec<&str> = hits.iter().map(|e| *e.value()).collect();
    values.sort_unstable();
    assert_eq!(values, vec!["a", "d"]);
}

#[test]
fn test_extent_covers_all_insertions() {
    let tree = sample_tree();
    assert_eq!(
        tree.extent(),
        BoundingBox::new(Point::new([-2, -1]), Point::new([15, 20]))
    );
}

#[test]
fn test_short_point_literal_is_rejected_and_harmless() {
    let mut tree = sample_tree();

    // A 1-element coordinate list cannot form a 2-D point.
    let err = Point::<i64, 2>::from_slice(&[0]).unwrap_err();
    assert!(matches!(
        err,
        TreeError::DimensionMismatch {
            expected: 2,
            actual: 1
        }
    ));

    // The tree is untouched by the failed construction.
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.search(&Point::new([6, 6])).len(), 2);

    // A well-formed point still inserts fine afterwards.
    let pt = Point::from_slice(&[30, 30]).unwrap();
    tree.insert_at(pt, "e").unwrap();
    assert_eq!(tree.len(), 5);
}

#[test]
fn test_extent_monotonicity_on_insert() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();

    let mut previous = tree.extent();
    for i in 0..200 {
        let x = rng.gen_range(-500..500);
        let y = rng.gen_range(-500..500);
        let w = rng.gen_range(0..40);
        let h = rng.gen_range(0..40);
        let inserted = BoundingBox::new(Point::new([x, y]), Point::new([x + w, y + h]));
        tree.insert(inserted.start, inserted.end, i).unwrap();

        let current = tree.extent();
        // The extent only ever grows, and always covers the new box.
        if i > 0 {
            assert!(current.contains(&previous));
        }
        assert!(current.contains(&inserted));
        previous = current;
    }
}

#[test]
fn test_random_workload_soundness_and_completeness() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree: RTree<i64, usize, 2> = RTree::new().unwrap();
    let mut boxes: Vec<BoundingBox<i64, 2>> = Vec::new();

    for i in 0..400 {
        let x = rng.gen_range(-200..200);
        let y = rng.gen_range(-200..200);
        let w = rng.gen_range(0..30);
        let h = rng.gen_range(0..30);
        let bb = BoundingBox::new(Point::new([x, y]), Point::new([x + w, y + h]));
        tree.insert(bb.start, bb.end, i).unwrap();
        boxes.push(bb);
    }

    tree.check_integrity(boxtree::CheckMode::Silent).unwrap();

    for _ in 0..200 {
        let pt = Point::new([rng.gen_range(-220..220), rng.gen_range(-220..220)]);
        let hits = tree.search(&pt);

        let mut found: Vec<usize> = hits.iter().map(|e| *e.value()).collect();
        found.sort_unstable();

        // Soundness: every reported box covers the query point.
        for entry in &hits {
            assert!(entry.extent().contains_point(&pt));
        }

        // Completeness: every inserted box covering the point is reported.
        let mut expected: Vec<usize> = boxes
            .iter()
            .enumerate()
            .filter(|(_, bb)| bb.contains_point(&pt))
            .map(|(i, _)| i)
            .collect();
        expected.sort_unstable();

        assert_eq!(found, expected);
    }
}

#[test]
fn test_float_coordinates() {
    let mut tree: RTree<f64, u32, 2> = RTree::new().unwrap();
    tree.insert(Point::new([0.5, 0.5]), Point::new([2.5, 1.5]), 1)
        .unwrap();
    tree.insert(Point::new([-1.25, 0.0]), Point::new([0.75, 3.0]), 2)
        .unwrap();

    let hits = tree.search(&Point::new([0.6, 1.0]));
    assert_eq!(hits.len(), 2);
    assert!(tree.search(&Point::new([2.6, 1.0])).is_empty());
}

#[test]
fn test_three_dimensional_tree() {
    let mut tree: RTree<i64, &str, 3> = RTree::new().unwrap();
    tree.insert(Point::new([0, 0, 0]), Point::new([4, 4, 4]), "cube")
        .unwrap();
    tree.insert(Point::new([10, 10, 10]), Point::new([12, 12, 12]), "far")
        .unwrap();

    assert_eq!(tree.search(&Point::new([2, 2, 2])).len(), 1);
    assert_eq!(tree.search(&Point::new([5, 2, 2])).len(), 0);
    assert_eq!(
        tree.extent(),
        BoundingBox::new(Point::new([0, 0, 0]), Point::new([12, 12, 12]))
    );
}
