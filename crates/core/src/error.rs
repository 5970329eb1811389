//! Error types for the simulation core.
//!
//! Rejections never mutate state: every function that can fail takes its input
//! by reference (or by value it owns) and returns a fresh value on success.

use thiserror::Error;

use crate::types::{PlayerColor, Position};

/// Why a placement was refused by the move validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("position {pos} is outside the {rows}x{cols} board")]
    OutOfBounds {
        pos: Position,
        rows: usize,
        cols: usize,
    },
    #[error("cell {pos} is owned by {owner}")]
    OwnedByOther { pos: Position, owner: PlayerColor },
}

/// Failures of the cascade engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CascadeError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    /// Internal invariant violation: a correct geometry always settles.
    #[error("cascade did not settle within {limit} waves")]
    WaveLimitExceeded { limit: usize },
}

/// Game-level rejections (turn order, lifecycle, roster).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    #[error("a cascade is still resolving")]
    AnimationInProgress,
    #[error("the game is already finished")]
    GameFinished,
    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn {
        expected: PlayerColor,
        got: PlayerColor,
    },
    #[error("invalid roster: {0}")]
    InvalidRoster(String),
    #[error("move index {got} is out of order (expected {expected})")]
    MoveOutOfOrder { expected: u32, got: u32 },
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error("cascade did not settle within {limit} waves")]
    WaveLimitExceeded { limit: usize },
}

impl From<CascadeError> for GameError {
    fn from(value: CascadeError) -> Self {
        match value {
            CascadeError::InvalidMove(e) => GameError::InvalidMove(e),
            CascadeError::WaveLimitExceeded { limit } => GameError::WaveLimitExceeded { limit },
        }
    }
}
