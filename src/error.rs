//! Configuration errors, detected before play begins.
//!
//! Terminal game outcomes (caught, timeout, puzzle attempts exhausted) are
//! expected end states, not errors; they live in
//! [`crate::session::LossReason`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Maze dimensions incompatible with the carving scheme: both must be
    /// odd and at least 5, or the exit cell is unreachable.
    #[error("maze dimensions {width}x{height} must be odd and at least 5x5")]
    BadDimensions { width: usize, height: usize },

    /// Per-level growth that would flip the parity of the dimensions and
    /// strand the exit.
    #[error("per-level growth {growth} must be even")]
    OddGrowth { growth: usize },

    /// The maze has too few open cells for the requested entity count.
    #[error("maze has {available} open cells, need {needed} for placement")]
    TooFewOpenCells { needed: usize, available: usize },

    /// Rejection sampling gave up: the constraints left no room.
    #[error("could not place {entity} after {attempts} attempts")]
    PlacementFailed {
        entity: &'static str,
        attempts: usize,
    },
}

pub type GameResult<T> = Result<T, GameError>;
