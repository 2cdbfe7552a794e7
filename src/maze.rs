//! Randomized depth-first maze carving.
//!
//! The generator walks the half-resolution lattice of odd coordinates,
//! carving two cells at a time, so the result is a perfect maze: a spanning
//! tree with exactly one path between any two open cells and a one-cell wall
//! border left intact.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{GameError, GameResult};
use crate::grid::{Dir, Grid, Pos, Tile, DIRS};

/// Cell the carve starts from; also the player's spawn cell.
pub const SEED: Pos = Pos { x: 1, y: 1 };

/// Both dimensions must be odd and at least 5, otherwise the exit cell at
/// `(width - 2, height - 2)` lands on an even coordinate the carve never
/// reaches.
pub fn check_dimensions(width: usize, height: usize) -> GameResult<()> {
    if width < 5 || height < 5 || width % 2 == 0 || height % 2 == 0 {
        return Err(GameError::BadDimensions { width, height });
    }
    Ok(())
}

/// The exit cell for a maze of the given size.
pub fn exit_pos(width: usize, height: usize) -> Pos {
    Pos::new(width - 2, height - 2)
}

/// Carve a maze into `grid` and mark the exit. The grid is reset to all
/// walls first. Dimensions must already satisfy [`check_dimensions`].
pub fn generate(grid: &mut Grid, rng: &mut impl Rng) {
    grid.reset();
    grid.set(SEED, Tile::Open);

    let mut stack = vec![SEED];
    while let Some(&pos) = stack.last() {
        let mut dirs = DIRS;
        dirs.shuffle(rng);

        let mut moved = false;
        for dir in dirs {
            if let Some((mid, target)) = jump(grid, pos, dir) {
                if grid.tile(target) == Tile::Wall {
                    grid.set(mid, Tile::Open);
                    grid.set(target, Tile::Open);
                    stack.push(target);
                    moved = true;
                    break;
                }
            }
        }

        if !moved {
            stack.pop();
        }
    }

    let exit = exit_pos(grid.width(), grid.height());
    grid.set(exit, Tile::Exit);
    debug!(
        "carved {}x{} maze, exit at ({}, {})",
        grid.width(),
        grid.height(),
        exit.x,
        exit.y
    );
}

/// The cell two steps away in `dir` together with the intervening cell, or
/// `None` if that would leave the grid.
fn jump(grid: &Grid, pos: Pos, dir: Dir) -> Option<(Pos, Pos)> {
    let mid = grid.neighbor(pos, dir)?;
    let target = grid.neighbor(mid, dir)?;
    Some((mid, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    fn carved(width: usize, height: usize, seed: u64) -> Grid {
        let mut grid = Grid::new(width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        generate(&mut grid, &mut rng);
        grid
    }

    fn reachable_from_seed(grid: &Grid) -> HashSet<Pos> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(SEED);
        queue.push_back(SEED);
        while let Some(pos) = queue.pop_front() {
            for dir in DIRS {
                if let Some(next) = grid.neighbor(pos, dir) {
                    if grid.is_walkable(next) && seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn rejects_even_or_tiny_dimensions() {
        assert!(check_dimensions(21, 21).is_ok());
        assert!(check_dimensions(20, 21).is_err());
        assert!(check_dimensions(21, 20).is_err());
        assert!(check_dimensions(3, 21).is_err());
    }

    #[test]
    fn every_open_cell_is_reachable() {
        for seed in 0..20 {
            let grid = carved(21, 15, seed);
            let reached = reachable_from_seed(&grid);
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let pos = Pos::new(x, y);
                    if grid.is_walkable(pos) {
                        assert!(reached.contains(&pos), "unreachable cell {:?}", pos);
                    }
                }
            }
        }
    }

    #[test]
    fn exit_is_marked_and_reachable() {
        for seed in 0..20 {
            let grid = carved(15, 15, seed);
            let exit = exit_pos(15, 15);
            assert_eq!(grid.tile(exit), Tile::Exit);
            assert!(reachable_from_seed(&grid).contains(&exit));
        }
    }

    #[test]
    fn border_stays_walled() {
        let grid = carved(21, 21, 7);
        for x in 0..21 {
            assert_eq!(grid.tile(Pos::new(x, 0)), Tile::Wall);
            assert_eq!(grid.tile(Pos::new(x, 20)), Tile::Wall);
        }
        for y in 0..21 {
            assert_eq!(grid.tile(Pos::new(0, y)), Tile::Wall);
            assert_eq!(grid.tile(Pos::new(20, y)), Tile::Wall);
        }
    }

    #[test]
    fn maze_is_a_spanning_tree() {
        // A connected graph is acyclic iff it has exactly nodes - 1 edges.
        // Count horizontal and vertical adjacencies between walkable cells.
        for seed in 0..20 {
            let grid = carved(17, 13, seed);
            let mut nodes = 0usize;
            let mut edges = 0usize;
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let pos = Pos::new(x, y);
                    if !grid.is_walkable(pos) {
                        continue;
                    }
                    nodes += 1;
                    for dir in [Dir::Right, Dir::Down] {
                        if let Some(next) = grid.neighbor(pos, dir) {
                            if grid.is_walkable(next) {
                                edges += 1;
                            }
                        }
                    }
                }
            }
            assert_eq!(edges, nodes - 1, "cycle or split in maze (seed {seed})");
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = carved(21, 15, 42);
        let b = carved(21, 15, 42);
        for y in 0..15 {
            for x in 0..21 {
                assert_eq!(a.tile(Pos::new(x, y)), b.tile(Pos::new(x, y)));
            }
        }
    }
}
