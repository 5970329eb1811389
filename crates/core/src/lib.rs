//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the board model and every rule that turns a placement into
//! a settled board. It has **no dependencies** on UI, networking, timing or
//! I/O, so the local game loop, the visual predictor and the authoritative host
//! all link this one implementation and cannot drift apart:
//!
//! - **Deterministic**: the same board and move always produce the same board
//!   and the same wave log
//! - **Value semantics**: every move returns a new board; inputs are never
//!   modified
//! - **Testable**: each rule lives in its own module with unit tests
//!
//! # Module Structure
//!
//! - [`geometry`]: neighbor sets and detonation thresholds
//! - [`board`]: flat row-major grid of cells
//! - [`rules`]: move validation
//! - [`cascade`]: wave-by-wave cascade resolution
//! - [`turn`]: turn rotation, elimination and win detection
//! - [`game_state`]: roster, board and turn bookkeeping
//! - [`error`]: rejection and invariant-violation types
//!
//! # Game Rules
//!
//! - A player may place a unit on an empty cell or on a cell they own
//! - A cell detonates when its count reaches its neighbor count (corner 2,
//!   edge 3, interior 4)
//! - All unstable cells detonate together; every neighbor hit is captured by
//!   the player who made the move
//! - Once two or more units are on the board, a player with no cells is out
//! - The last player with cells wins
//!
//! # Example
//!
//! ```
//! use chain_reaction_core::GameState;
//! use chain_reaction_core::types::{PlayerColor, Position};
//!
//! let game = GameState::with_default_players(2).unwrap();
//! let next = game.play(Position::new(0, 0)).unwrap().state;
//!
//! assert_eq!(next.board().total_units(), 1);
//! assert_eq!(next.current_player().color, PlayerColor::Blue);
//! // the original state is untouched
//! assert_eq!(game.board().total_units(), 0);
//! ```

pub mod board;
pub mod cascade;
pub mod error;
pub mod game_state;
pub mod geometry;
pub mod rules;
pub mod turn;

pub use chain_reaction_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Cell};
pub use cascade::{
    apply_move, apply_move_with, place, resolve, resolve_with, step, unstable_cells,
    CascadeOptions, DetonationWave, MoveOutcome,
};
pub use error::{CascadeError, GameError, MoveError};
pub use game_state::{GameState, MoveRecord, Player, Transition};
pub use geometry::{detonation_threshold, neighbors};
pub use rules::{is_valid_move, validate_move};
pub use turn::{
    advance_turn, advance_turn_with, check_winner, check_winner_with, is_alive, EliminationRule,
};
