//! Mystery Maze: procedurally carved mazes, arithmetic puzzle gates, a
//! countdown clock, and autonomous enemies.
//!
//! The crate is the game model; rendering and input live in the binary and
//! talk to [`session::Session`] through a snapshot/command interface.

pub mod enemy;
pub mod error;
pub mod grid;
pub mod maze;
pub mod placement;
pub mod puzzle;
pub mod save;
pub mod session;

pub use error::{GameError, GameResult};
pub use grid::{Dir, Grid, Pos, Tile};
pub use session::{GameConfig, LossReason, Phase, PowerUpEffect, Session};
