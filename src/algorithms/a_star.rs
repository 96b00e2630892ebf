use crate::algorithms::common::{
    NoObserver, SearchObserver, SearchOutcome, Step, Termination,
};
use crate::algorithms::heuristic::estimate;
use crate::algorithms::path::reconstruct;
use crate::error::GridError;
use crate::grid::{Grid, Position};
use crate::statistics::SearchStats;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Frontier priority: `f` first, then insertion order.
///
/// `seq` is unique per push, so no two entries ever compare equal and equal
/// `f` values are dequeued in the order they were pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierKey {
    f: u32,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: FrontierKey,
    pos: Position,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed comparison to make BinaryHeap a min-heap
        other
            .key
            .f
            .cmp(&self.key.f)
            .then_with(|| other.key.seq.cmp(&self.key.seq))
    }
}

/// Result of a single [`AStar::advance`] call.
#[derive(Debug)]
pub enum Advance<'a> {
    /// A non-goal cell was expanded.
    Expanded(Step<'a>),
    /// The goal was popped; carries the reconstructed path.
    Reached(Vec<Position>),
    /// Nothing left on the frontier.
    Exhausted,
}

/// One A* invocation over a borrowed grid.
///
/// All tables live here and are dropped with the value; nothing carries over
/// between searches. Holding `&Grid` for the whole run means the grid cannot
/// be mutated while a search is in progress.
pub struct AStar<'g> {
    grid: &'g Grid,
    start: Position,
    end: Position,
    g_score: FxHashMap<Position, u32>,
    f_score: FxHashMap<Position, u32>,
    came_from: FxHashMap<Position, Position>,
    frontier: BinaryHeap<Entry>,
    in_frontier: FxHashSet<Position>,
    next_seq: u64,
    opened: Vec<Position>,
    stats: SearchStats,
}

impl<'g> AStar<'g> {
    /// Validates the request and seeds the frontier with `start`.
    ///
    /// Fails without allocating search state if either endpoint is out of
    /// bounds, the endpoints coincide or are barriers, or the grid's
    /// neighbor caches are stale.
    pub fn new(grid: &'g Grid, start: Position, end: Position) -> Result<Self, GridError> {
        validate(grid, start, end)?;

        let mut search = AStar {
            grid,
            start,
            end,
            g_score: FxHashMap::default(),
            f_score: FxHashMap::default(),
            came_from: FxHashMap::default(),
            frontier: BinaryHeap::new(),
            in_frontier: FxHashSet::default(),
            next_seq: 0,
            opened: Vec::with_capacity(4),
            stats: SearchStats::default(),
        };
        let h = estimate(start, end);
        search.g_score.insert(start, 0);
        search.f_score.insert(start, h);
        search.push(start, h);
        Ok(search)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Best known cost from the start, `None` meaning infinity.
    pub fn g_score(&self, pos: Position) -> Option<u32> {
        self.g_score.get(&pos).copied()
    }

    pub fn f_score(&self, pos: Position) -> Option<u32> {
        self.f_score.get(&pos).copied()
    }

    pub fn came_from(&self, pos: Position) -> Option<Position> {
        self.came_from.get(&pos).copied()
    }

    pub fn is_enqueued(&self, pos: Position) -> bool {
        self.in_frontier.contains(&pos)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Positions with a finite cost so far.
    pub fn discovered(&self) -> impl Iterator<Item = Position> + '_ {
        self.g_score.keys().copied()
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pops the lowest-priority cell and expands it.
    ///
    /// Once the goal has been reached the frontier is dropped, so further
    /// calls return [`Advance::Exhausted`].
    pub fn advance(&mut self) -> Advance<'_> {
        let Some(Entry { pos: current, .. }) = self.frontier.pop() else {
            return Advance::Exhausted;
        };
        self.in_frontier.remove(&current);
        self.stats.expansions += 1;

        if current == self.end {
            self.frontier.clear();
            self.in_frontier.clear();
            return Advance::Reached(reconstruct(&self.came_from, self.end));
        }

        let grid = self.grid;
        let current_g = self.g(current);
        self.opened.clear();

        for &neighbor in grid.cell_at(current).neighbors() {
            let tentative = current_g.saturating_add(1);
            if tentative >= self.g(neighbor) {
                continue;
            }
            let f = tentative + estimate(neighbor, self.end);
            self.came_from.insert(neighbor, current);
            self.g_score.insert(neighbor, tentative);
            self.f_score.insert(neighbor, f);

            // An enqueued cell keeps the key it was pushed with.
            if !self.in_frontier.contains(&neighbor) {
                self.push(neighbor, f);
                self.opened.push(neighbor);
            }
        }

        log::trace!(
            "expanded {} (g={}, opened {}, frontier {})",
            current,
            current_g,
            self.opened.len(),
            self.frontier.len()
        );

        Advance::Expanded(Step {
            index: self.stats.expansions,
            current,
            g: current_g,
            f: self.f_score.get(&current).copied().unwrap_or(u32::MAX),
            opened: &self.opened,
            frontier_len: self.frontier.len(),
        })
    }

    fn g(&self, pos: Position) -> u32 {
        self.g_score.get(&pos).copied().unwrap_or(u32::MAX)
    }

    fn push(&mut self, pos: Position, f: u32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.frontier.push(Entry {
            key: FrontierKey { f, seq },
            pos,
        });
        self.in_frontier.insert(pos);
        self.stats.pushes += 1;
        self.stats.max_frontier = self.stats.max_frontier.max(self.frontier.len());
    }
}

fn validate(grid: &Grid, start: Position, end: Position) -> Result<(), GridError> {
    let start_cell = grid.get(start)?;
    let end_cell = grid.get(end)?;
    if start == end {
        return Err(GridError::endpoints(format!(
            "start and end are both {start}"
        )));
    }
    if !start_cell.is_passable() {
        return Err(GridError::endpoints(format!("start {start} is a barrier")));
    }
    if !end_cell.is_passable() {
        return Err(GridError::endpoints(format!("end {end} is a barrier")));
    }
    if grid.is_stale() {
        return Err(GridError::StaleNeighbors);
    }
    Ok(())
}

/// The start and end cells marked on the grid via [`crate::grid::Role`].
pub fn marked_endpoints(grid: &Grid) -> Result<(Position, Position), GridError> {
    let start = grid
        .start()
        .ok_or_else(|| GridError::endpoints("no start cell is marked"))?;
    let end = grid
        .end()
        .ok_or_else(|| GridError::endpoints("no end cell is marked"))?;
    Ok((start, end))
}

/// Runs A* from `start` to `end` without observation.
pub fn search(grid: &Grid, start: Position, end: Position) -> Result<SearchOutcome, GridError> {
    search_with_observer(grid, start, end, &mut NoObserver)
}

/// Runs A* from `start` to `end`, calling `observer` after every expansion.
///
/// Exhaustion and cancellation are outcomes, not errors: both come back as
/// `Ok` with an empty path.
pub fn search_with_observer<O>(
    grid: &Grid,
    start: Position,
    end: Position,
    observer: &mut O,
) -> Result<SearchOutcome, GridError>
where
    O: SearchObserver + ?Sized,
{
    let started = Instant::now();
    let mut astar = AStar::new(grid, start, end)?;
    log::debug!("searching {} -> {} on {n}x{n} grid", start, end, n = grid.size());

    let (termination, path) = loop {
        let flow = match astar.advance() {
            Advance::Expanded(step) => observer.on_expand(&step),
            Advance::Reached(path) => {
                observer.on_path(&path);
                break (Termination::Reached, path);
            }
            Advance::Exhausted => break (Termination::Exhausted, Vec::new()),
        };
        if flow.is_break() {
            break (Termination::Cancelled, Vec::new());
        }
    };

    let mut stats = astar.stats.clone();
    stats.elapsed = started.elapsed();
    log::debug!(
        "search {:?} after {} expansions, path length {}",
        termination,
        stats.expansions,
        path.len()
    );

    Ok(SearchOutcome {
        termination,
        path,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::observer_fn;
    use crate::grid::Role;
    use std::ops::ControlFlow;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn frontier_orders_by_f_then_insertion() {
        let mut heap = BinaryHeap::new();
        for (f, seq, col) in [(5, 0, 0), (3, 1, 1), (3, 2, 2), (4, 3, 3)] {
            heap.push(Entry {
                key: FrontierKey { f, seq },
                pos: p(0, col),
            });
        }
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.pos.col)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn expansion_trace_on_open_three_by_three() {
        let grid = Grid::new(3).unwrap();
        let mut trace = Vec::new();
        let outcome = search_with_observer(&grid, p(0, 0), p(2, 2), &mut observer_fn(|step| {
            trace.push((step.current, step.opened.to_vec()));
            ControlFlow::Continue(())
        }))
        .unwrap();

        assert_eq!(
            trace,
            vec![
                (p(0, 0), vec![p(1, 0), p(0, 1)]),
                (p(1, 0), vec![p(2, 0), p(1, 1)]),
                (p(0, 1), vec![p(0, 2)]),
                (p(2, 0), vec![p(2, 1)]),
                (p(1, 1), vec![p(1, 2)]),
                (p(0, 2), vec![]),
                (p(2, 1), vec![p(2, 2)]),
                (p(1, 2), vec![]),
            ]
        );
        assert_eq!(outcome.path, vec![p(1, 0), p(2, 0), p(2, 1), p(2, 2)]);
        assert_eq!(outcome.stats.expansions, 9);
        assert_eq!(outcome.stats.pushes, 9);
    }

    #[test]
    fn start_is_seeded_with_heuristic_priority() {
        let grid = Grid::new(5).unwrap();
        let astar = AStar::new(&grid, p(1, 1), p(4, 3)).unwrap();
        assert_eq!(astar.g_score(p(1, 1)), Some(0));
        assert_eq!(astar.f_score(p(1, 1)), Some(5));
        assert!(astar.is_enqueued(p(1, 1)));
        assert_eq!(astar.frontier_len(), 1);
        assert_eq!(astar.g_score(p(0, 0)), None);
    }

    #[test]
    fn popped_cell_leaves_membership() {
        let grid = Grid::new(4).unwrap();
        let mut astar = AStar::new(&grid, p(0, 0), p(3, 3)).unwrap();
        assert!(matches!(astar.advance(), Advance::Expanded(_)));
        assert!(!astar.is_enqueued(p(0, 0)));
        assert!(astar.is_enqueued(p(1, 0)));
        assert!(astar.is_enqueued(p(0, 1)));
        assert_eq!(astar.came_from(p(1, 0)), Some(p(0, 0)));
    }

    #[test]
    fn every_finite_cost_is_backed_by_a_predecessor_chain() {
        let grid: Grid = "\
S.....
.####.
.#..#.
.#.##.
......
...#.E
"
        .parse()
        .unwrap();
        let (start, end) = marked_endpoints(&grid).unwrap();
        let mut astar = AStar::new(&grid, start, end).unwrap();
        loop {
            for pos in astar.discovered() {
                let chain = reconstruct(&astar.came_from, pos);
                assert_eq!(chain.len() as u32, astar.g_score(pos).unwrap());
            }
            match astar.advance() {
                Advance::Expanded(_) => {}
                Advance::Reached(path) => {
                    assert_eq!(path.len(), 10);
                    break;
                }
                Advance::Exhausted => panic!("goal should be reachable"),
            }
        }
        assert!(matches!(astar.advance(), Advance::Exhausted));
    }

    #[test]
    fn cancellation_returns_empty_path() {
        let grid = Grid::new(10).unwrap();
        let before = grid.clone();
        let mut calls = 0;
        let outcome = search_with_observer(&grid, p(0, 0), p(9, 9), &mut observer_fn(|_| {
            calls += 1;
            if calls == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }))
        .unwrap();
        assert_eq!(outcome.termination, Termination::Cancelled);
        assert!(!outcome.found());
        assert!(outcome.path.is_empty());
        assert_eq!(calls, 3);
        assert_eq!(grid, before);
    }

    #[test]
    fn observer_sees_path_on_success() {
        struct Recorder(Vec<Position>);
        impl SearchObserver for Recorder {
            fn on_expand(&mut self, _step: &Step<'_>) -> ControlFlow<()> {
                ControlFlow::Continue(())
            }
            fn on_path(&mut self, path: &[Position]) {
                self.0 = path.to_vec();
            }
        }

        let grid = Grid::new(4).unwrap();
        let mut recorder = Recorder(Vec::new());
        let outcome = search_with_observer(&grid, p(3, 0), p(0, 3), &mut recorder).unwrap();
        assert_eq!(recorder.0, outcome.path);
        assert_eq!(outcome.path.last(), Some(&p(0, 3)));
    }

    #[test]
    fn invalid_endpoints_are_rejected() {
        let mut grid = Grid::new(3).unwrap();
        assert!(matches!(
            search(&grid, p(1, 1), p(1, 1)),
            Err(GridError::InvalidEndpoints { .. })
        ));

        grid.set_passable(p(2, 2), false).unwrap();
        grid.refresh_neighbors();
        assert!(matches!(
            search(&grid, p(0, 0), p(2, 2)),
            Err(GridError::InvalidEndpoints { .. })
        ));
        assert!(matches!(
            search(&grid, p(2, 2), p(0, 0)),
            Err(GridError::InvalidEndpoints { .. })
        ));
    }

    #[test]
    fn out_of_bounds_endpoint_is_rejected() {
        let grid = Grid::new(3).unwrap();
        assert_eq!(
            search(&grid, p(0, 0), p(0, 3)).unwrap_err(),
            GridError::OutOfBounds {
                position: p(0, 3),
                size: 3
            }
        );
    }

    #[test]
    fn stale_grid_is_rejected() {
        let mut grid = Grid::new(3).unwrap();
        grid.set_passable(p(1, 1), false).unwrap();
        assert_eq!(
            search(&grid, p(0, 0), p(2, 2)).unwrap_err(),
            GridError::StaleNeighbors
        );
    }

    #[test]
    fn marked_endpoints_require_both_roles() {
        let mut grid = Grid::new(3).unwrap();
        assert!(marked_endpoints(&grid).is_err());
        grid.set_role(p(0, 0), Role::Start).unwrap();
        assert!(marked_endpoints(&grid).is_err());
        grid.set_role(p(2, 1), Role::End).unwrap();
        assert_eq!(marked_endpoints(&grid).unwrap(), (p(0, 0), p(2, 1)));
    }
}
