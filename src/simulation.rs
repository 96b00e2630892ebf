use crate::algorithms::a_star::{marked_endpoints, search_with_observer};
use crate::algorithms::common::Termination;
use crate::algorithms::heuristic::estimate;
use crate::config::Config;
use crate::error::{GridError, SimulationError};
use crate::grid::{Grid, Position, Role};
use crate::render::TerminalRenderer;
use crate::statistics::Report;
use pathfinding::prelude::astar;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::ops::Range;
use std::time::Duration;

/// Builds the grid described by `config`: the `--map` layout if given,
/// otherwise a random one. `--start`/`--end` override any marked endpoints.
pub fn build_grid(config: &Config) -> Result<Grid, SimulationError> {
    let mut grid = match &config.map {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| SimulationError::Io {
                path: path.clone(),
                source,
            })?;
            text.parse::<Grid>()?
        }
        None => random_grid(config)?,
    };

    if config.start.is_some() && config.start == config.end {
        return Err(GridError::endpoints("start and end are the same cell").into());
    }
    if let Some(start) = config.start {
        grid.set_role(start, Role::Start)?;
    }
    if let Some(end) = config.end {
        grid.set_role(end, Role::End)?;
    }
    grid.refresh_dirty();
    Ok(grid)
}

/// Random layout: start in the top-left quadrant, end in the bottom-right,
/// and up to `num_barriers` barriers elsewhere. A drawn endpoint never lands
/// on the other one.
fn random_grid(config: &Config) -> Result<Grid, SimulationError> {
    let size = config.grid_size;
    let mut grid = Grid::new(size)?;
    if size < 2 {
        return Err(GridError::endpoints("random layouts need a grid of at least 2x2").into());
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    log::info!("random layout seed: {}", seed);

    let half = size / 2;
    let start = match config.start {
        Some(start) => start,
        None => draw_cell(&mut rng, size, 0..half, config.end),
    };
    let end = match config.end {
        Some(end) => end,
        None => draw_cell(&mut rng, size, half..size, Some(start)),
    };
    grid.set_role(start, Role::Start)?;
    grid.set_role(end, Role::End)?;

    // Place barriers randomly, never on the endpoints
    let mut placed = 0;
    let mut attempts = 0;
    while placed < config.num_barriers && attempts < config.num_barriers * 3 {
        let pos = Position {
            row: rng.gen_range(0..size),
            col: rng.gen_range(0..size),
        };
        if pos != start && pos != end && grid.get(pos)?.is_passable() {
            grid.set_passable(pos, false)?;
            placed += 1;
        }
        attempts += 1;
    }

    grid.refresh_neighbors();
    Ok(grid)
}

/// Picks a cell with row and column in `range`, skipping `avoid`. Falls back
/// to the whole grid when `avoid` is the only cell in the quadrant.
fn draw_cell(
    rng: &mut StdRng,
    size: usize,
    range: Range<usize>,
    avoid: Option<Position>,
) -> Position {
    let quadrant: Vec<Position> = range
        .clone()
        .flat_map(|row| range.clone().map(move |col| Position { row, col }))
        .filter(|&pos| Some(pos) != avoid)
        .collect();
    if let Some(&pos) = quadrant.choose(rng) {
        return pos;
    }
    let anywhere: Vec<Position> = (0..size * size)
        .map(|i| Position::new(i / size, i % size))
        .filter(|&pos| Some(pos) != avoid)
        .collect();
    // size >= 2, so at least three cells remain
    anywhere[rng.gen_range(0..anywhere.len())]
}

/// Optimal cost from `start` to `end` computed by the `pathfinding` crate
/// over the same neighbor caches, or `None` if `end` is unreachable.
pub fn reference_cost(grid: &Grid, start: Position, end: Position) -> Option<usize> {
    astar(
        &start,
        |pos| {
            grid.get(*pos)
                .map(|cell| {
                    cell.neighbors()
                        .iter()
                        .map(|&n| (n, 1usize))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_else(|_| Vec::new())
        },
        |pos| estimate(*pos, end) as usize,
        |pos| *pos == end,
    )
    .map(|(_, cost)| cost)
}

/// Builds the grid, runs the search with the terminal renderer and
/// cross-checks the result against the reference search.
pub fn run(config: &Config) -> Result<Report, SimulationError> {
    let grid = build_grid(config)?;
    let (start, end) = marked_endpoints(&grid)?;

    let visualize = !config.no_visualization && !config.quiet;
    let mut renderer = TerminalRenderer::new(&grid).with_budget(config.max_expansions);
    if visualize {
        renderer = renderer.animated(Duration::from_millis(config.delay_ms));
    }
    if !config.quiet {
        renderer.print_frame(&format!("=== A* SEARCH === Start: {} | End: {}", start, end));
    }

    let outcome = search_with_observer(&grid, start, end, &mut renderer)?;

    if !config.quiet {
        let header = match outcome.termination {
            Termination::Reached => format!("SUCCESS: path of {} steps", outcome.cost()),
            Termination::Exhausted => "FAILED: no path exists".to_string(),
            Termination::Cancelled => "CANCELLED: expansion budget reached".to_string(),
        };
        renderer.print_frame(&format!("=== SEARCH COMPLETE === {}", header));
    }

    let reference_cost = reference_cost(&grid, start, end);
    let report = Report {
        grid_size: grid.size(),
        barriers: grid.cells().filter(|c| !c.is_passable()).count(),
        found: outcome.found(),
        cancelled: outcome.termination == Termination::Cancelled,
        path_cost: outcome.cost(),
        reference_cost,
        stats: outcome.stats,
    };
    if !report.matches_reference() {
        log::warn!(
            "path cost {} differs from reference {:?}",
            report.path_cost,
            report.reference_cost
        );
    }
    Ok(report)
}
