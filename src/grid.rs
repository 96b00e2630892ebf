use crate::error::GridError;
use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;

/// A cell coordinate. `row` grows downwards, `col` grows to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Position {
    type Err = GridError;

    /// Parses `"row,col"`, tolerating whitespace around either number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GridError::ParsePosition(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(err)?;
        let row = row.trim().parse().map_err(|_| err())?;
        let col = col.trim().parse().map_err(|_| err())?;
        Ok(Position { row, col })
    }
}

/// What a cell means to the search, independent of how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    None,
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    passable: bool,
    role: Role,
    neighbors: Vec<Position>,
}

impl Cell {
    fn new(position: Position) -> Self {
        Cell {
            position,
            passable: true,
            role: Role::None,
            neighbors: Vec::with_capacity(4),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_passable(&self) -> bool {
        self.passable
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Passable in-bounds orthogonal neighbors as of the last refresh,
    /// ordered down, up, right, left.
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }
}

/// A square grid of cells stored row-major.
///
/// Neighbor lists are a cached view of passability. Any call to
/// [`Grid::set_passable`] that changes a cell marks the grid stale, and
/// searching a stale grid is refused until [`Grid::refresh_neighbors`] (or
/// [`Grid::refresh_dirty`]) has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    start: Option<Position>,
    end: Option<Position>,
    dirty: FxHashSet<Position>,
}

impl Grid {
    /// Builds a `size` x `size` grid with every cell passable and no roles.
    /// Neighbor caches are populated, so the grid can be searched right away.
    pub fn new(size: usize) -> Result<Self, GridError> {
        if size == 0 {
            return Err(GridError::EmptyGrid);
        }
        let count = size
            .checked_mul(size)
            .ok_or(GridError::TooLarge { size })?;
        let cells = (0..count)
            .map(|i| Cell::new(Position::new(i / size, i % size)))
            .collect();
        let mut grid = Grid {
            size,
            cells,
            start: None,
            end: None,
            dirty: FxHashSet::default(),
        };
        grid.refresh_neighbors();
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn get(&self, pos: Position) -> Result<&Cell, GridError> {
        let idx = self.index(pos)?;
        Ok(&self.cells[idx])
    }

    /// Unchecked lookup for positions already known to be in bounds.
    pub(crate) fn cell_at(&self, pos: Position) -> &Cell {
        &self.cells[self.flat(pos)]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn start(&self) -> Option<Position> {
        self.start
    }

    pub fn end(&self) -> Option<Position> {
        self.end
    }

    /// True when passability changed since the last refresh.
    pub fn is_stale(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn set_passable(&mut self, pos: Position, passable: bool) -> Result<(), GridError> {
        let idx = self.index(pos)?;
        let cell = &mut self.cells[idx];
        if cell.passable != passable {
            cell.passable = passable;
            self.dirty.insert(pos);
        }
        Ok(())
    }

    /// Assigns `role` to the cell at `pos`.
    ///
    /// A grid has at most one start and one end, so assigning `Start` or
    /// `End` takes that role away from whichever cell held it before. A cell
    /// carries a single role; its previous one is dropped.
    pub fn set_role(&mut self, pos: Position, role: Role) -> Result<(), GridError> {
        let idx = self.index(pos)?;
        let previous = self.cells[idx].role;
        if previous == role {
            return Ok(());
        }

        match previous {
            Role::Start => self.start = None,
            Role::End => self.end = None,
            Role::None => {}
        }

        let holder = match role {
            Role::Start => self.start.replace(pos),
            Role::End => self.end.replace(pos),
            Role::None => None,
        };
        if let Some(holder) = holder {
            let holder_idx = self.flat(holder);
            self.cells[holder_idx].role = Role::None;
        }

        self.cells[idx].role = role;
        Ok(())
    }

    /// Erases a cell: passable again and without a role.
    pub fn reset_cell(&mut self, pos: Position) -> Result<(), GridError> {
        self.index(pos)?;
        self.set_role(pos, Role::None)?;
        self.set_passable(pos, true)
    }

    /// Returns every cell to its freshly built state.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.passable = true;
            cell.role = Role::None;
        }
        self.start = None;
        self.end = None;
        self.refresh_neighbors();
    }

    /// Recomputes and stores the neighbor cache of the cell at `pos`.
    pub fn neighbors_of(&mut self, pos: Position) -> Result<&[Position], GridError> {
        let idx = self.index(pos)?;
        self.cells[idx].neighbors = self.passable_neighbors(pos);
        Ok(&self.cells[idx].neighbors)
    }

    /// Full sweep: recomputes the neighbor cache of every cell.
    pub fn refresh_neighbors(&mut self) {
        for idx in 0..self.cells.len() {
            let pos = self.cells[idx].position;
            self.cells[idx].neighbors = self.passable_neighbors(pos);
        }
        self.dirty.clear();
    }

    /// Incremental refresh touching only cells whose cache can have changed:
    /// the dirty cells and their orthogonal neighbors. Leaves the caches
    /// identical to what [`Grid::refresh_neighbors`] would produce.
    pub fn refresh_dirty(&mut self) {
        if self.dirty.is_empty() {
            return;
        }
        let mut affected: FxHashSet<Position> = FxHashSet::default();
        for &pos in &self.dirty {
            affected.insert(pos);
            affected.extend(self.orthogonal(pos));
        }
        log::trace!(
            "refreshing {} caches for {} dirty cells",
            affected.len(),
            self.dirty.len()
        );
        for pos in affected {
            let idx = self.flat(pos);
            self.cells[idx].neighbors = self.passable_neighbors(pos);
        }
        self.dirty.clear();
    }

    fn passable_neighbors(&self, pos: Position) -> Vec<Position> {
        self.orthogonal(pos)
            .filter(|&n| self.cells[self.flat(n)].passable)
            .collect()
    }

    /// In-bounds orthogonal positions: down, up, right, left.
    fn orthogonal(&self, pos: Position) -> impl Iterator<Item = Position> {
        let size = self.size;
        let Position { row, col } = pos;
        [
            (row + 1 < size).then(|| Position::new(row + 1, col)),
            row.checked_sub(1).map(|r| Position::new(r, col)),
            (col + 1 < size).then(|| Position::new(row, col + 1)),
            col.checked_sub(1).map(|c| Position::new(row, c)),
        ]
        .into_iter()
        .flatten()
    }

    fn index(&self, pos: Position) -> Result<usize, GridError> {
        if self.contains(pos) {
            Ok(self.flat(pos))
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                size: self.size,
            })
        }
    }

    fn flat(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses a square text layout: `.` open, `#` barrier, `S` start, `E` end.
    /// Lowercase `s` and `e` mark an endpoint sitting on a barrier.
    /// Blank lines are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<(usize, &str)> = s
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        let mut grid = Grid::new(rows.len())?;
        for (row, &(line_no, line)) in rows.iter().enumerate() {
            let width = line.chars().count();
            if width != grid.size {
                return Err(GridError::Layout {
                    line: line_no,
                    reason: format!("expected {} columns, found {}", grid.size, width),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                match ch {
                    '.' => {}
                    '#' => grid.set_passable(pos, false)?,
                    'S' | 'E' | 's' | 'e' => {
                        let (role, taken) = if ch.eq_ignore_ascii_case(&'S') {
                            (Role::Start, grid.start.is_some())
                        } else {
                            (Role::End, grid.end.is_some())
                        };
                        if taken {
                            return Err(GridError::Layout {
                                line: line_no,
                                reason: format!("more than one '{ch}'"),
                            });
                        }
                        grid.set_role(pos, role)?;
                        if ch.is_ascii_lowercase() {
                            grid.set_passable(pos, false)?;
                        }
                    }
                    other => {
                        return Err(GridError::Layout {
                            line: line_no,
                            reason: format!("unexpected character {other:?}"),
                        })
                    }
                }
            }
        }
        grid.refresh_neighbors();
        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            for cell in row {
                let ch = match (cell.role, cell.passable) {
                    (Role::Start, true) => 'S',
                    (Role::Start, false) => 's',
                    (Role::End, true) => 'E',
                    (Role::End, false) => 'e',
                    (Role::None, false) => '#',
                    (Role::None, true) => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
