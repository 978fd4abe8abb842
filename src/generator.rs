//! Symbol generator: weighted palette draw with a bias toward reusing an adjacent colour.

use crate::grid::{ColorId, Grid};
use crate::palette::{Palette, PaletteError};
use crate::rng::RandomSource;
use rand::distributions::WeightedIndex;
use std::sync::Arc;
use thiserror::Error;

/// Default chance of copying a neighbour's colour.
pub const DEFAULT_NEIGHBOUR_BIAS: f64 = 0.35;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("neighbour bias must be in [0, 1], got {0}")]
    InvalidBias(f64),
    #[error(transparent)]
    Palette(#[from] PaletteError),
}

/// Where a drawn colour came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    /// Copied from the tile above or to the left.
    Neighbour,
    /// Weighted palette draw.
    Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub color: ColorId,
    pub source: DrawSource,
}

#[derive(Debug, Clone)]
pub struct SymbolGenerator {
    palette: Arc<Palette>,
    weights: WeightedIndex<u32>,
    bias: f64,
}

impl SymbolGenerator {
    pub fn new(palette: Arc<Palette>, bias: f64) -> Result<Self, GeneratorError> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(GeneratorError::InvalidBias(bias));
        }
        let weights = WeightedIndex::new(palette.weights()).map_err(|_| PaletteError::ZeroWeights)?;
        Ok(Self {
            palette,
            weights,
            bias,
        })
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Colour for a new tile at (row, col).
    pub fn next_color<R: RandomSource>(
        &self,
        grid: &Grid,
        row: usize,
        col: usize,
        rng: &mut R,
    ) -> ColorId {
        self.draw(grid, row, col, rng).color
    }

    /// Only the tile above and the tile to the left are consulted: in a top-left to
    /// bottom-right fill those are the ones already placed.
    pub fn draw<R: RandomSource>(&self, grid: &Grid, row: usize, col: usize, rng: &mut R) -> Draw {
        if rng.uniform() < self.bias {
            let above = (row > 0).then(|| grid.color_at(row - 1, col)).flatten();
            let left = (col > 0).then(|| grid.color_at(row, col - 1)).flatten();
            let color = match (above, left) {
                (Some(a), Some(l)) => Some(if rng.index(2) == 0 { a } else { l }),
                (Some(c), None) | (None, Some(c)) => Some(c),
                (None, None) => None,
            };
            if let Some(color) = color {
                return Draw {
                    color,
                    source: DrawSource::Neighbour,
                };
            }
        }
        Draw {
            color: ColorId(rng.weighted_choice(&self.weights) as u8),
            source: DrawSource::Palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::rng::make_rng;

    fn generator(bias: f64) -> SymbolGenerator {
        SymbolGenerator::new(Arc::new(Palette::balanced()), bias).unwrap()
    }

    #[test]
    fn test_rejects_bias_outside_unit_interval() {
        let p = Arc::new(Palette::balanced());
        assert!(matches!(
            SymbolGenerator::new(p.clone(), 1.5),
            Err(GeneratorError::InvalidBias(_))
        ));
        assert!(SymbolGenerator::new(p.clone(), f64::NAN).is_err());
        assert!(SymbolGenerator::new(p, 0.0).is_ok());
    }

    #[test]
    fn test_no_neighbours_always_draws_palette() {
        let g = generator(1.0);
        let grid = Grid::new();
        let mut rng = make_rng(Some(3));
        for _ in 0..500 {
            assert_eq!(g.draw(&grid, 2, 2, &mut rng).source, DrawSource::Palette);
        }
    }

    #[test]
    fn test_full_bias_copies_a_neighbour() {
        let g = generator(1.0);
        let mut grid = Grid::new();
        grid.set(0, 1, Some(Tile::new(ColorId(7), 0, 1)));
        grid.set(1, 0, Some(Tile::new(ColorId(11), 1, 0)));
        // below and right are ignored even when filled
        grid.set(2, 1, Some(Tile::new(ColorId(3), 2, 1)));
        grid.set(1, 2, Some(Tile::new(ColorId(4), 1, 2)));
        let mut rng = make_rng(Some(9));
        let mut seen = [false; 2];
        for _ in 0..200 {
            let d = g.draw(&grid, 1, 1, &mut rng);
            assert_eq!(d.source, DrawSource::Neighbour);
            match d.color {
                ColorId(7) => seen[0] = true,
                ColorId(11) => seen[1] = true,
                other => panic!("unexpected colour {other:?}"),
            }
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_neighbour_reuse_rate_converges_to_bias() {
        const CALLS: usize = 20_000;
        let bias = DEFAULT_NEIGHBOUR_BIAS;
        let g = generator(bias);
        let mut grid = Grid::new();
        grid.set(0, 2, Some(Tile::new(ColorId(5), 0, 2)));
        let mut rng = make_rng(Some(0xC0FFEE));

        let mut reused = 0usize;
        let mut same_color = 0usize;
        for _ in 0..CALLS {
            let d = g.draw(&grid, 1, 2, &mut rng);
            if d.source == DrawSource::Neighbour {
                reused += 1;
            }
            if d.color == ColorId(5) {
                same_color += 1;
            }
        }
        let rate = reused as f64 / CALLS as f64;
        assert!((rate - bias).abs() < 0.02, "reuse rate {rate}");

        // Palette draws hit the neighbour colour 1/19 of the time on top of the bias.
        let expected = bias + (1.0 - bias) / 19.0;
        let color_rate = same_color as f64 / CALLS as f64;
        assert!((color_rate - expected).abs() < 0.02, "colour rate {color_rate}");
    }

    #[test]
    fn test_zero_bias_never_reuses() {
        let g = generator(0.0);
        let mut grid = Grid::new();
        grid.set(0, 0, Some(Tile::new(ColorId(1), 0, 0)));
        let mut rng = make_rng(Some(5));
        for _ in 0..1_000 {
            assert_eq!(g.draw(&grid, 1, 0, &mut rng).source, DrawSource::Palette);
        }
    }

    #[test]
    fn test_weights_shape_palette_draws() {
        let colors = vec![
            ("heavy".to_string(), crate::palette::Rgb(1, 1, 1)),
            ("never".to_string(), crate::palette::Rgb(2, 2, 2)),
        ];
        let p = Palette::new(colors, &[1, 0]).unwrap();
        let g = SymbolGenerator::new(Arc::new(p), 0.0).unwrap();
        let grid = Grid::new();
        let mut rng = make_rng(Some(11));
        for _ in 0..200 {
            assert_eq!(g.next_color(&grid, 0, 0, &mut rng), ColorId(0));
        }
    }
}
