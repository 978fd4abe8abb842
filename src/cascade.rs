//! Pop, collapse and refill: the mutation half of a cascade step.

use crate::cluster::Cluster;
use crate::generator::SymbolGenerator;
use crate::grid::{COLS, Coord, Grid, ROWS, Tile};
use crate::rng::RandomSource;

/// Clear every cluster cell. Returns the popped coordinates in row-major order.
pub fn pop(grid: &mut Grid, clusters: &[Cluster]) -> Vec<Coord> {
    let mut popped: Vec<Coord> = clusters
        .iter()
        .flat_map(|c| c.cells.iter().copied())
        .filter(|&at| grid.take(at).is_some())
        .collect();
    popped.sort_unstable();
    popped
}

/// Gravity: per column, pack surviving tiles against the bottom in their original
/// order. Tiles never change column. Returns how many tiles moved.
pub fn collapse(grid: &mut Grid) -> usize {
    let mut moved = 0;
    for col in 0..COLS {
        let mut survivors: Vec<Tile> = (0..ROWS).filter_map(|row| grid.get(row, col)).collect();
        for row in (0..ROWS).rev() {
            let tile = survivors.pop();
            if tile.is_some_and(|t| t.row != row) {
                moved += 1;
            }
            grid.set(row, col, tile);
        }
    }
    moved
}

/// Fill every empty cell, top-to-bottom then left-to-right, so the generator's
/// above/left bias always sees placed neighbours. Returns the new tile count.
pub fn refill<R: RandomSource>(grid: &mut Grid, generator: &SymbolGenerator, rng: &mut R) -> usize {
    let mut filled = 0;
    for at in Grid::coords() {
        if grid.get_at(at).is_none() {
            let color = generator.next_color(grid, at.row, at.col, rng);
            grid.set(at.row, at.col, Some(Tile::new(color, at.row, at.col)));
            filled += 1;
        }
    }
    filled
}

/// Fresh grid filled in refill order.
pub fn fill_new_grid<R: RandomSource>(generator: &SymbolGenerator, rng: &mut R) -> Grid {
    let mut grid = Grid::new();
    refill(&mut grid, generator, rng);
    grid
}
