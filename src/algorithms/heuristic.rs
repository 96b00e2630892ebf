use crate::grid::Position;

/// Manhattan distance between two positions.
///
/// Admissible and consistent for unit-cost orthogonal moves, which is what
/// makes the first expansion of the goal an optimal one.
pub fn estimate(a: Position, b: Position) -> u32 {
    (a.row.abs_diff(b.row) + a.col.abs_diff(b.col)) as u32
}
