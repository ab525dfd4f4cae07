//! Builders and probes shared across the integration tests.

use boxtree::{Point, RTree, TreeResult};

/// Coordinate of the `i`-th grid square's lower corner.
///
/// Squares are placed two units apart so that no two of them touch; a search
/// at a square's own corner then matches exactly that square.
pub fn grid_coord(i: usize) -> i64 {
    i as i64 * 2
}

/// The lower corner of the `i`-th grid square.
pub fn grid_point(i: usize) -> Point<i64, 2> {
    Point::new([grid_coord(i), grid_coord(i)])
}

/// Inserts `n` disjoint unit squares along the diagonal, value `i` for the
/// `i`-th square.
pub fn build_grid_tree(n: usize) -> TreeResult<RTree<i64, usize, 2>> {
    let mut tree = RTree::new()?;
    insert_grid_squares(&mut tree, 0..n)?;
    Ok(tree)
}

/// Inserts the given range of grid squares into an existing tree.
pub fn insert_grid_squares(
    tree: &mut RTree<i64, usize, 2>,
    range: std::ops::Range<usize>,
) -> TreeResult<()> {
    for i in range {
        let c = grid_coord(i);
        tree.insert(Point::new([c, c]), Point::new([c + 1, c + 1]), i)?;
    }
    Ok(())
}

/// The sorted values of every hit at `pt`.
pub fn values_at(tree: &RTree<i64, usize, 2>, pt: &Point<i64, 2>) -> Vec<usize> {
    let hits = tree.search(pt);
    let mut values: Vec<usize> = hits.iter().map(|e| *e.value()).collect();
    values.sort_unstable();
    values
}
