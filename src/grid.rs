//! Grid: 5x5 cells, each empty or holding a coloured tile.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ROWS: usize = 5;
pub const COLS: usize = 5;

/// Palette index of a tile colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(pub u8);

impl ColorId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Grid coordinate. row=0 is top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Up/down/left/right neighbours that lie inside the grid. Never diagonals.
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        const NEIGHBOURS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        NEIGHBOURS_4.into_iter().filter_map(move |(dr, dc)| {
            let r = self.row as isize + dr;
            let c = self.col as isize + dc;
            (r >= 0 && r < ROWS as isize && c >= 0 && c < COLS as isize)
                .then(|| Coord::new(r as usize, c as usize))
        })
    }
}

/// A placed tile. Only `row` changes after creation (during collapse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub color: ColorId,
    pub row: usize,
    pub col: usize,
}

impl Tile {
    pub fn new(color: ColorId, row: usize, col: usize) -> Self {
        Self { color, row, col }
    }

    #[inline]
    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }
}

/// The playfield. `cells[row][col]`, row 0 is top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: [[Option<Tile>; COLS]; ROWS],
}

impl Grid {
    /// All cells empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid fully populated from a colour table.
    pub fn from_colors(colors: [[ColorId; COLS]; ROWS]) -> Self {
        let mut grid = Self::new();
        for (row, line) in colors.iter().enumerate() {
            for (col, &color) in line.iter().enumerate() {
                grid.set(row, col, Some(Tile::new(color, row, col)));
            }
        }
        grid
    }

    /// Panics on out-of-range coordinates.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        check_bounds(row, col);
        self.cells[row][col]
    }

    /// Panics on out-of-range coordinates. A stored tile takes the target coordinates.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, tile: Option<Tile>) {
        check_bounds(row, col);
        self.cells[row][col] = tile.map(|t| Tile { row, col, ..t });
    }

    #[inline]
    pub fn get_at(&self, at: Coord) -> Option<Tile> {
        self.get(at.row, at.col)
    }

    /// Removes and returns the tile at `at`.
    pub fn take(&mut self, at: Coord) -> Option<Tile> {
        check_bounds(at.row, at.col);
        self.cells[at.row][at.col].take()
    }

    #[inline]
    pub fn color_at(&self, row: usize, col: usize) -> Option<ColorId> {
        self.get(row, col).map(|t| t.color)
    }

    /// Row-major iterator over every coordinate.
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Coord::new(row, col)))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }
}

#[inline]
fn check_bounds(row: usize, col: usize) {
    assert!(
        row < ROWS && col < COLS,
        "grid coordinate ({row}, {col}) out of range {ROWS}x{COLS}"
    );
}

/// `A` is colour 0, `B` colour 1, ... `.` is empty.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let ch = match cell {
                    None => '.',
                    Some(t) if t.color.0 < 26 => char::from(b'A' + t.color.0),
                    Some(_) => '?',
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("expected {ROWS} rows, found {0}")]
    RowCount(usize),
    #[error("row {row}: expected {COLS} cells, found {found}")]
    RowWidth { row: usize, found: usize },
    #[error("row {row}: invalid cell {ch:?}")]
    InvalidCell { row: usize, ch: char },
}

impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() != ROWS {
            return Err(GridParseError::RowCount(lines.len()));
        }
        let mut grid = Self::new();
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != COLS {
                return Err(GridParseError::RowWidth { row, found });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '.' => None,
                    'A'..='Z' => Some(Tile::new(ColorId(ch as u8 - b'A'), row, col)),
                    _ => return Err(GridParseError::InvalidCell { row, ch }),
                };
                grid.set(row, col, tile);
            }
        }
        Ok(grid)
    }
}
