//! Entity placement by rejection sampling.
//!
//! Obstacles, the power-up, and enemy starts all land on open cells, never
//! sharing a cell. Sampling is bounded: a maze too crowded for the requested
//! entity count is a configuration error, not an infinite loop.

use log::debug;
use rand::Rng;

use crate::error::{GameError, GameResult};
use crate::grid::{Grid, Pos, Tile};

/// Uniform draws per grid cell before giving up on an entity.
const ATTEMPTS_PER_CELL: usize = 20;

/// Fail early when the maze cannot hold `needed` entities on open cells.
pub fn ensure_capacity(grid: &Grid, needed: usize) -> GameResult<()> {
    let available = grid.open_cells().len();
    if available < needed {
        return Err(GameError::TooFewOpenCells { needed, available });
    }
    Ok(())
}

/// Draw uniform coordinates until `accept` passes, within the retry bound.
fn place_one(
    grid: &Grid,
    rng: &mut impl Rng,
    entity: &'static str,
    accept: impl Fn(Pos) -> bool,
) -> GameResult<Pos> {
    let attempts = grid.width() * grid.height() * ATTEMPTS_PER_CELL;
    for _ in 0..attempts {
        let pos = Pos::new(
            rng.gen_range(0..grid.width()),
            rng.gen_range(0..grid.height()),
        );
        if accept(pos) {
            return Ok(pos);
        }
    }
    Err(GameError::PlacementFailed { entity, attempts })
}

/// Place `count` puzzle obstacles on open cells, marking them in the grid.
/// The player's cell stays clear.
pub fn place_obstacles(
    grid: &mut Grid,
    count: usize,
    player: Pos,
    rng: &mut impl Rng,
) -> GameResult<Vec<Pos>> {
    ensure_capacity(grid, count + 1)?;
    let mut blocks = Vec::with_capacity(count);
    for _ in 0..count {
        let pos = place_one(grid, rng, "obstacle", |p| {
            grid.tile(p) == Tile::Open && p != player
        })?;
        grid.set(pos, Tile::Obstacle);
        blocks.push(pos);
    }
    debug!("placed {} obstacles", blocks.len());
    Ok(blocks)
}

/// Place the power-up overlay on an open cell. Obstacle and exit cells are
/// already excluded by their tile state.
pub fn place_power_up(grid: &Grid, player: Pos, rng: &mut impl Rng) -> GameResult<Pos> {
    place_one(grid, rng, "power-up", |p| {
        grid.tile(p) == Tile::Open && p != player
    })
}

/// Place `count` enemy starts on walkable cells, each outside the square
/// exclusion zone around the player and off every cell in `occupied`.
pub fn place_enemies(
    grid: &Grid,
    count: usize,
    player: Pos,
    min_spawn_distance: usize,
    occupied: &[Pos],
    rng: &mut impl Rng,
) -> GameResult<Vec<Pos>> {
    let mut spawns: Vec<Pos> = Vec::with_capacity(count);
    for _ in 0..count {
        let pos = place_one(grid, rng, "enemy", |p| {
            grid.tile(p) == Tile::Open
                && p != player
                && !p.within_square(player, min_spawn_distance)
                && !occupied.contains(&p)
                && !spawns.contains(&p)
        })?;
        spawns.push(pos);
    }
    debug!("placed {} enemies", spawns.len());
    Ok(spawns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn carved(seed: u64) -> (Grid, StdRng) {
        let mut grid = Grid::new(21, 21);
        let mut rng = StdRng::seed_from_u64(seed);
        maze::generate(&mut grid, &mut rng);
        (grid, rng)
    }

    #[test]
    fn entities_never_overlap_or_sit_on_walls() {
        for seed in 0..10 {
            let (mut grid, mut rng) = carved(seed);
            let player = maze::SEED;
            let blocks = place_obstacles(&mut grid, 2, player, &mut rng).unwrap();
            let power_up = place_power_up(&grid, player, &mut rng).unwrap();
            let enemies =
                place_enemies(&grid, 3, player, 5, &[power_up], &mut rng).unwrap();

            let mut all = blocks.clone();
            all.push(power_up);
            all.extend(&enemies);
            for (i, a) in all.iter().enumerate() {
                assert_ne!(*a, player);
                for b in &all[i + 1..] {
                    assert_ne!(a, b, "two entities share a cell (seed {seed})");
                }
            }
            for pos in &blocks {
                assert_eq!(grid.tile(*pos), Tile::Obstacle);
            }
            assert_eq!(grid.tile(power_up), Tile::Open);
            for pos in &enemies {
                assert_eq!(grid.tile(*pos), Tile::Open);
            }
        }
    }

    #[test]
    fn enemy_spawns_respect_the_square_zone() {
        for seed in 0..10 {
            let (grid, mut rng) = carved(seed);
            let player = maze::SEED;
            let enemies = place_enemies(&grid, 2, player, 5, &[], &mut rng).unwrap();
            for pos in enemies {
                assert!(
                    !pos.within_square(player, 5),
                    "enemy at {:?} inside exclusion zone (seed {seed})",
                    pos
                );
            }
        }
    }

    #[test]
    fn overfull_maze_is_a_config_error() {
        let mut grid = Grid::new(5, 5);
        // Only two open cells: no room for three obstacles plus the player.
        grid.set(Pos::new(1, 1), Tile::Open);
        grid.set(Pos::new(2, 1), Tile::Open);
        let mut rng = StdRng::seed_from_u64(0);
        let err = place_obstacles(&mut grid, 3, Pos::new(1, 1), &mut rng).unwrap_err();
        assert!(matches!(err, GameError::TooFewOpenCells { .. }));
    }

    #[test]
    fn impossible_constraints_terminate() {
        // A single open cell next to the player: the exclusion zone covers
        // the whole grid, so enemy placement must give up, not spin.
        let mut grid = Grid::new(5, 5);
        grid.set(Pos::new(1, 1), Tile::Open);
        grid.set(Pos::new(2, 1), Tile::Open);
        let mut rng = StdRng::seed_from_u64(0);
        let err = place_enemies(&grid, 1, Pos::new(1, 1), 5, &[], &mut rng).unwrap_err();
        assert!(matches!(err, GameError::PlacementFailed { .. }));
    }
}
