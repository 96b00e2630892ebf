use crate::algorithms::common::{SearchObserver, Step};
use crate::grid::{Grid, Position, Role};
use std::fmt;
use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

/// How a cell is drawn. Derived from the grid plus observer callbacks, never
/// stored on the grid itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Empty,
    Barrier,
    Start,
    End,
    Open,
    Closed,
    Path,
}

impl DisplayState {
    pub fn glyph(self) -> char {
        match self {
            DisplayState::Empty => '.',
            DisplayState::Barrier => '#',
            DisplayState::Start => 'S',
            DisplayState::End => 'E',
            DisplayState::Open => 'o',
            DisplayState::Closed => 'x',
            DisplayState::Path => '*',
        }
    }
}

/// Observer that tracks display states and optionally redraws the grid in
/// the terminal after every expansion.
pub struct TerminalRenderer<'g> {
    grid: &'g Grid,
    states: Vec<DisplayState>,
    visualize: bool,
    delay: Duration,
    max_expansions: Option<usize>,
}

impl<'g> TerminalRenderer<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        let states = grid
            .cells()
            .map(|cell| match (cell.role(), cell.is_passable()) {
                (Role::Start, _) => DisplayState::Start,
                (Role::End, _) => DisplayState::End,
                (Role::None, false) => DisplayState::Barrier,
                (Role::None, true) => DisplayState::Empty,
            })
            .collect();
        TerminalRenderer {
            grid,
            states,
            visualize: false,
            delay: Duration::ZERO,
            max_expansions: None,
        }
    }

    /// Redraw after each expansion, pausing `delay` between frames.
    pub fn animated(mut self, delay: Duration) -> Self {
        self.visualize = true;
        self.delay = delay;
        self
    }

    /// Stop the search once this many cells have been expanded.
    pub fn with_budget(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Display state of `pos`, `None` outside the grid.
    pub fn state(&self, pos: Position) -> Option<DisplayState> {
        if !self.grid.contains(pos) {
            return None;
        }
        Some(self.states[pos.row * self.grid.size() + pos.col])
    }

    fn mark(&mut self, pos: Position, state: DisplayState) {
        let idx = pos.row * self.grid.size() + pos.col;
        // Endpoints keep their own glyph whatever the search does to them.
        if !matches!(self.states[idx], DisplayState::Start | DisplayState::End) {
            self.states[idx] = state;
        }
    }

    /// The grid with row and column headers, one character per cell.
    pub fn frame(&self) -> String {
        self.to_string()
    }

    pub fn print_frame(&self, header: &str) {
        if self.visualize {
            clear_screen();
        }
        println!("{}", header);
        println!("Legend: S=Start, E=End, #=Barrier, o=Open, x=Closed, *=Path, .=Empty");
        print!("{}", self.frame());
        println!();
    }
}

impl fmt::Display for TerminalRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.grid.size();
        write!(f, "   ")?;
        for col in 0..size {
            write!(f, "{:2}", col % 10)?;
        }
        writeln!(f)?;
        for (row, states) in self.states.chunks(size).enumerate() {
            write!(f, "{:2} ", row)?;
            for state in states {
                write!(f, "{} ", state.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl SearchObserver for TerminalRenderer<'_> {
    fn on_expand(&mut self, step: &Step<'_>) -> ControlFlow<()> {
        for &pos in step.opened {
            self.mark(pos, DisplayState::Open);
        }
        self.mark(step.current, DisplayState::Closed);

        if self.visualize {
            self.print_frame(&format!(
                "=== A* SEARCH === Step: {} | Current: {} | g: {} | Frontier: {}",
                step.index, step.current, step.g, step.frontier_len
            ));
            thread::sleep(self.delay);
        }

        match self.max_expansions {
            Some(limit) if step.index >= limit => {
                log::info!("expansion budget of {} reached, stopping", limit);
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn on_path(&mut self, path: &[Position]) {
        for &pos in path {
            self.mark(pos, DisplayState::Path);
        }
    }
}

/// Clear the terminal screen (only used when visualization is enabled)
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::search_with_observer;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn initial_states_follow_roles_and_barriers() {
        let grid: Grid = "S.\n#E\n".parse().unwrap();
        let renderer = TerminalRenderer::new(&grid);
        assert_eq!(renderer.state(p(0, 0)), Some(DisplayState::Start));
        assert_eq!(renderer.state(p(0, 1)), Some(DisplayState::Empty));
        assert_eq!(renderer.state(p(1, 0)), Some(DisplayState::Barrier));
        assert_eq!(renderer.state(p(1, 1)), Some(DisplayState::End));
    }

    #[test]
    fn search_marks_closed_open_and_path() {
        let grid: Grid = "S...\n.##.\n....\n...E\n".parse().unwrap();
        let mut renderer = TerminalRenderer::new(&grid);
        let outcome = search_with_observer(&grid, p(0, 0), p(3, 3), &mut renderer).unwrap();
        assert!(outcome.found());

        assert_eq!(renderer.state(p(0, 0)), Some(DisplayState::Start));
        assert_eq!(renderer.state(p(3, 3)), Some(DisplayState::End));
        assert_eq!(renderer.state(p(1, 1)), Some(DisplayState::Barrier));
        for &pos in &outcome.path[..outcome.path.len() - 1] {
            assert_eq!(renderer.state(pos), Some(DisplayState::Path));
        }
        assert!(grid
            .cells()
            .any(|c| renderer.state(c.position()) == Some(DisplayState::Closed)));
    }

    #[test]
    fn budget_cancels_the_search() {
        let grid = Grid::new(8).unwrap();
        let mut renderer = TerminalRenderer::new(&grid).with_budget(Some(2));
        let outcome = search_with_observer(&grid, p(0, 0), p(7, 7), &mut renderer).unwrap();
        assert!(!outcome.found());
        assert_eq!(outcome.stats.expansions, 2);
    }

    #[test]
    fn state_outside_the_grid_is_none() {
        let grid = Grid::new(3).unwrap();
        let renderer = TerminalRenderer::new(&grid);
        assert_eq!(renderer.state(p(3, 0)), None);
        assert_eq!(renderer.state(p(0, 3)), None);
        assert_eq!(renderer.state(p(2, 2)), Some(DisplayState::Empty));
    }

    #[test]
    fn frame_has_headers_and_glyphs() {
        let grid: Grid = "S#\n.E\n".parse().unwrap();
        let frame = TerminalRenderer::new(&grid).frame();
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "    0 1");
        assert_eq!(lines[1], " 0 S # ");
        assert_eq!(lines[2], " 1 . E ");
    }
}
