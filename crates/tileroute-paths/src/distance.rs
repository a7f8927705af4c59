use tileroute_core::Point;

/// Manhattan (L1) distance between two points.
///
/// Exact over the whole `i32` plane, including neighbours that wrapped at
/// the grid edge.
#[inline]
pub fn manhattan(a: Point, b: Point) -> u64 {
    u64::from(a.x.abs_diff(b.x)) + u64::from(a.y.abs_diff(b.y))
}

/// Octile split of the offset between two points: `(diagonal, straight)`
/// step counts of the shortest 8-connected walk ignoring obstacles.
#[inline]
pub fn octile(a: Point, b: Point) -> (u32, u32) {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let diag = dx.min(dy);
    (diag, dx.max(dy) - diag)
}
