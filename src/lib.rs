//! Shortest paths on a square grid of barriers using A* with a Manhattan
//! heuristic.
//!
//! Build a [`Grid`], mark barriers and endpoints, refresh its neighbor
//! caches, then call [`search`] or [`search_with_observer`]:
//!
//! ```
//! use grid_astar::{search, Grid, Position};
//!
//! let mut grid = Grid::new(5).unwrap();
//! for col in 1..5 {
//!     grid.set_passable(Position::new(2, col), false).unwrap();
//! }
//! grid.refresh_neighbors();
//!
//! let outcome = search(&grid, Position::new(0, 0), Position::new(4, 4)).unwrap();
//! assert!(outcome.found());
//! assert_eq!(outcome.path.len(), 8);
//! assert!(outcome.path.contains(&Position::new(2, 0)));
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod grid;
pub mod render;
pub mod simulation;
pub mod statistics;

pub use algorithms::a_star::{marked_endpoints, search, search_with_observer, Advance, AStar};
pub use algorithms::common::{
    observer_fn, NoObserver, SearchObserver, SearchOutcome, Step, Termination,
};
pub use algorithms::heuristic::estimate;
pub use error::{GridError, SimulationError};
pub use grid::{Cell, Grid, Position, Role};
pub use statistics::SearchStats;
