//! The autonomous enemy: a randomized depth-first walk with backtracking.
//!
//! Mirrors the maze carve, but over single-step moves on the finished grid.
//! Each enemy keeps its own visited set and a LIFO history of the walk; once
//! the history is exhausted it has covered its whole reachable region and
//! stands still.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::grid::{Grid, Pos, DIRS};

pub struct Enemy {
    pos: Pos,
    visited: HashSet<Pos>,
    trail: Vec<Pos>,
}

impl Enemy {
    pub fn new(start: Pos) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        Enemy {
            pos: start,
            visited,
            trail: vec![start],
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// True once the walk has nowhere left to go.
    pub fn exhausted(&self) -> bool {
        self.trail.is_empty()
    }

    /// Advance one step: pick an unvisited walkable neighbor at random, or
    /// retreat along the trail when none remains.
    pub fn step(&mut self, grid: &Grid, rng: &mut impl Rng) {
        let mut candidates = Vec::new();
        for dir in DIRS {
            if let Some(next) = grid.neighbor(self.pos, dir) {
                if grid.is_walkable(next) && !self.visited.contains(&next) {
                    candidates.push(next);
                }
            }
        }

        if let Some(&next) = candidates.choose(rng) {
            self.pos = next;
            self.visited.insert(next);
            self.trail.push(next);
        } else {
            // Pure backtracking: drop the current cell, move to the one
            // beneath it. An empty trail leaves the enemy stationary.
            self.trail.pop();
            if let Some(&prev) = self.trail.last() {
                self.pos = prev;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::maze;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn visits_every_reachable_cell_exactly_once() {
        let mut grid = Grid::new(11, 11);
        let mut rng = StdRng::seed_from_u64(3);
        maze::generate(&mut grid, &mut rng);

        let mut enemy = Enemy::new(maze::SEED);
        let mut forward_visits = vec![enemy.pos()];
        let mut last = enemy.pos();
        while !enemy.exhausted() {
            enemy.step(&grid, &mut rng);
            if enemy.pos() != last && !forward_visits.contains(&enemy.pos()) {
                forward_visits.push(enemy.pos());
            }
            last = enemy.pos();
        }

        let walkable: Vec<Pos> = (0..grid.height())
            .flat_map(|y| (0..grid.width()).map(move |x| Pos::new(x, y)))
            .filter(|p| grid.is_walkable(*p))
            .collect();
        assert_eq!(forward_visits.len(), walkable.len());
    }

    #[test]
    fn stationary_after_exhaustion() {
        let mut grid = Grid::new(5, 5);
        grid.set(Pos::new(1, 1), Tile::Open);
        grid.set(Pos::new(2, 1), Tile::Open);
        let mut rng = StdRng::seed_from_u64(0);

        let mut enemy = Enemy::new(Pos::new(1, 1));
        for _ in 0..20 {
            enemy.step(&grid, &mut rng);
        }
        assert!(enemy.exhausted());
        let parked = enemy.pos();
        for _ in 0..10 {
            enemy.step(&grid, &mut rng);
            assert_eq!(enemy.pos(), parked);
        }
    }

    #[test]
    fn corridor_walk_reaches_the_far_end() {
        // A single corridor: with one unvisited neighbor at each step the
        // walk is forced forward, no randomness left to matter.
        let mut grid = Grid::new(7, 3);
        for x in 1..6 {
            grid.set(Pos::new(x, 1), Tile::Open);
        }
        let mut rng = StdRng::seed_from_u64(9);
        let mut enemy = Enemy::new(Pos::new(1, 1));
        for _ in 0..4 {
            enemy.step(&grid, &mut rng);
        }
        assert_eq!(enemy.pos(), Pos::new(5, 1));
    }
}
