use crate::grid::Position;
use rustc_hash::FxHashMap;

/// Walks `came_from` back from `end` until reaching a position with no
/// predecessor (the start).
///
/// The result is ordered start to end and excludes the start itself, so its
/// length equals the number of steps taken.
pub fn reconstruct(came_from: &FxHashMap<Position, Position>, end: Position) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        path.push(current);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_predecessors_back_to_start() {
        let p = Position::new;
        let mut came_from = FxHashMap::default();
        came_from.insert(p(0, 1), p(0, 0));
        came_from.insert(p(1, 1), p(0, 1));
        came_from.insert(p(1, 2), p(1, 1));
        assert_eq!(
            reconstruct(&came_from, p(1, 2)),
            vec![p(0, 1), p(1, 1), p(1, 2)]
        );
    }

    #[test]
    fn position_without_predecessor_gives_empty_path() {
        let came_from = FxHashMap::default();
        assert!(reconstruct(&came_from, Position::new(3, 3)).is_empty());
    }
}
