use auv_core::Position;

/// Manhattan (L1) distance between two cells.
#[inline]
pub fn manhattan(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

