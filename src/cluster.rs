//! Cluster detection: maximal 4-connected same-colour regions of size >= 3.

use crate::grid::{COLS, ColorId, Coord, Grid, ROWS};
use std::collections::VecDeque;

/// Smallest region that pops.
pub const MIN_CLUSTER: usize = 3;

/// A poppable region. Cells are in breadth-first discovery order from the
/// row-major-first cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub color: ColorId,
    pub cells: Vec<Coord>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cells.contains(&at)
    }
}

/// Row-major scan with breadth-first flood fill. Regions smaller than
/// `MIN_CLUSTER` are dropped; empty cells never seed or join a region.
pub fn find_clusters(grid: &Grid) -> Vec<Cluster> {
    let mut visited = [[false; COLS]; ROWS];
    let mut clusters = Vec::new();

    for start in Grid::coords() {
        if visited[start.row][start.col] {
            continue;
        }
        let Some(tile) = grid.get_at(start) else {
            continue;
        };
        let color = tile.color;
        let mut region = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start.row][start.col] = true;

        while let Some(at) = queue.pop_front() {
            region.push(at);
            for n in at.neighbours() {
                if !visited[n.row][n.col] && grid.color_at(n.row, n.col) == Some(color) {
                    visited[n.row][n.col] = true;
                    queue.push_back(n);
                }
            }
        }

        if region.len() >= MIN_CLUSTER {
            clusters.push(Cluster {
                color,
                cells: region,
            });
        }
    }
    clusters
}

/// Total cells across clusters.
pub fn cell_count(clusters: &[Cluster]) -> usize {
    clusters.iter().map(Cluster::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SymbolGenerator;
    use crate::palette::Palette;
    use crate::rng::make_rng;
    use rand::Rng;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    /// Size of the same-colour region containing `at`, by plain recursion.
    fn region_size(g: &Grid, at: Coord, seen: &mut HashSet<Coord>) -> usize {
        let Some(color) = g.color_at(at.row, at.col) else {
            return 0;
        };
        if !seen.insert(at) {
            return 0;
        }
        1 + at
            .neighbours()
            .filter(|n| g.color_at(n.row, n.col) == Some(color))
            .map(|n| region_size(g, n, seen))
            .sum::<usize>()
    }

    fn brute_force_popping_cells(g: &Grid) -> HashSet<Coord> {
        Grid::coords()
            .filter(|&at| region_size(g, at, &mut HashSet::new()) >= MIN_CLUSTER)
            .collect()
    }

    fn is_connected(cluster: &Cluster) -> bool {
        let cells: HashSet<Coord> = cluster.cells.iter().copied().collect();
        let mut seen = HashSet::from([cluster.cells[0]]);
        let mut stack = vec![cluster.cells[0]];
        while let Some(at) = stack.pop() {
            for n in at.neighbours() {
                if cells.contains(&n) && seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen.len() == cells.len()
    }

    #[test]
    fn test_l_shape_single_cluster() {
        let g = grid(
            "AFGHI
             AJKLM
             AAANO
             PQRST
             UVWXY",
        );
        let clusters = find_clusters(&g);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].color, ColorId(0));
        assert_eq!(clusters[0].len(), 5);
        for at in [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)] {
            assert!(clusters[0].contains(Coord::new(at.0, at.1)));
        }
    }

    #[test]
    fn test_diagonals_do_not_connect() {
        let g = grid(
            "ABCDE
             BADEC
             CDAEB
             DEBAC
             ECDBA",
        );
        assert!(find_clusters(&g).is_empty());
    }

    #[test]
    fn test_pairs_do_not_pop() {
        let g = grid(
            "AABCD
             CDEFG
             BBCDE
             FGHIJ
             KLMNN",
        );
        assert!(find_clusters(&g).is_empty());
    }

    #[test]
    fn test_empty_cells_never_join() {
        let g = grid(
            ".....
             .....
             A.A.A
             B.B.B
             ABABA",
        );
        assert!(find_clusters(&g).is_empty());
        assert!(find_clusters(&Grid::new()).is_empty());
    }

    #[test]
    fn test_multiple_clusters_are_disjoint() {
        let g = grid(
            "AAABB
             CDEBF
             CCGBH
             IJKLM
             NNNNN",
        );
        let clusters = find_clusters(&g);
        let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
        assert_eq!(sizes, vec![3, 4, 3, 5]);
        assert_eq!(cell_count(&clusters), 15);
    }

    #[test]
    fn test_full_board_is_one_cluster() {
        let g = grid("CCCCC\nCCCCC\nCCCCC\nCCCCC\nCCCCC");
        let clusters = find_clusters(&g);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), ROWS * COLS);
    }

    #[test]
    fn test_random_grids_match_brute_force() {
        // A small palette and full bias make large and oddly shaped regions common.
        let colors = (0..3)
            .map(|i| (format!("c{i}"), crate::palette::Rgb(i, i, i)))
            .collect();
        let palette = Arc::new(Palette::new(colors, &[1, 1, 1]).unwrap());
        let generator = SymbolGenerator::new(palette, 0.5).unwrap();
        let mut rng = make_rng(Some(42));

        for _ in 0..500 {
            let mut g = Grid::new();
            for at in Grid::coords() {
                // leave a few holes to exercise empty handling
                if rng.gen_ratio(1, 10) {
                    continue;
                }
                let color = generator.next_color(&g, at.row, at.col, &mut rng);
                g.set(at.row, at.col, Some(crate::grid::Tile::new(color, at.row, at.col)));
            }

            let clusters = find_clusters(&g);
            let mut union = HashSet::new();
            for c in &clusters {
                assert!(c.len() >= MIN_CLUSTER);
                assert!(c.cells.iter().all(|at| g.color_at(at.row, at.col) == Some(c.color)));
                assert!(is_connected(c), "cluster not 4-connected:\n{g}");
                for &at in &c.cells {
                    assert!(union.insert(at), "clusters overlap at {at:?}:\n{g}");
                }
            }
            assert_eq!(union, brute_force_popping_cells(&g), "grid:\n{g}");
        }
    }
}
