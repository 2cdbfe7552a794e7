//! The maze grid and its coordinate types.

use serde::{Deserialize, Serialize};

/// State of a single maze cell.
///
/// The active power-up is not a tile: it is an overlay tracked by the
/// session and always sits on an `Open` cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Wall,
    Open,
    Exit,
    Obstacle,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Square exclusion test: true when both axis offsets are below
    /// `threshold`. This is the spawn-distance contract, not a radial
    /// distance.
    pub fn within_square(self, other: Pos, threshold: usize) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx < threshold && dy < threshold
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

pub const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Fixed-size 2D cell array. Indexing out of range is a programming error
/// and panics; use [`Grid::neighbor`] to step safely.
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
}

impl Grid {
    /// A grid of the given size, every cell a wall.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            tiles: vec![vec![Tile::Wall; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Refill every cell with walls.
    pub fn reset(&mut self) {
        for row in &mut self.tiles {
            row.fill(Tile::Wall);
        }
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        self.tiles[pos.y][pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        self.tiles[pos.y][pos.x] = tile;
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// True iff the cell can be stood on: `Open` or `Exit`. Obstacles are
    /// not walkable by this primitive; their passability is mediated by the
    /// puzzle flow.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        matches!(self.tile(pos), Tile::Open | Tile::Exit)
    }

    /// The adjacent cell one step in `dir`, or `None` at the grid edge.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx)?;
        let ny = pos.y.checked_add_signed(dy)?;
        let next = Pos::new(nx, ny);
        if self.in_bounds(next) {
            Some(next)
        } else {
            None
        }
    }

    /// All open cells, row-major.
    pub fn open_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tiles[y][x] == Tile::Open {
                    cells.push(Pos::new(x, y));
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_all_walls() {
        let grid = Grid::new(7, 5);
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(grid.tile(Pos::new(x, y)), Tile::Wall);
            }
        }
    }

    #[test]
    fn walkable_is_open_or_exit_only() {
        let mut grid = Grid::new(5, 5);
        grid.set(Pos::new(1, 1), Tile::Open);
        grid.set(Pos::new(2, 1), Tile::Exit);
        grid.set(Pos::new(3, 1), Tile::Obstacle);
        assert!(grid.is_walkable(Pos::new(1, 1)));
        assert!(grid.is_walkable(Pos::new(2, 1)));
        assert!(!grid.is_walkable(Pos::new(3, 1)));
        assert!(!grid.is_walkable(Pos::new(0, 0)));
    }

    #[test]
    fn neighbor_stops_at_edges() {
        let grid = Grid::new(3, 3);
        assert_eq!(grid.neighbor(Pos::new(0, 0), Dir::Up), None);
        assert_eq!(grid.neighbor(Pos::new(0, 0), Dir::Left), None);
        assert_eq!(grid.neighbor(Pos::new(2, 2), Dir::Down), None);
        assert_eq!(
            grid.neighbor(Pos::new(1, 1), Dir::Right),
            Some(Pos::new(2, 1))
        );
    }

    #[test]
    fn square_exclusion_is_per_axis() {
        let a = Pos::new(1, 1);
        // Inside the zone on both axes.
        assert!(a.within_square(Pos::new(4, 2), 5));
        // Far on one axis is enough to escape the square.
        assert!(!a.within_square(Pos::new(6, 1), 5));
        assert!(!a.within_square(Pos::new(1, 9), 5));
    }

    #[test]
    #[should_panic]
    fn out_of_range_tile_access_panics() {
        let grid = Grid::new(3, 3);
        grid.tile(Pos::new(3, 0));
    }
}
