//! Deterministic replay of a move log.

use tracing::debug;

use crate::core::{GameError, GameState, MoveRecord, Player};

/// Rebuild the state reached by `moves` from a fresh game for `players`.
pub fn replay(players: Vec<Player>, moves: &[MoveRecord]) -> Result<GameState, GameError> {
    replay_from(GameState::new(players)?, moves)
}

/// Apply `moves` on top of `state`.
///
/// Move indices must continue exactly from `state.move_count()`.
pub fn replay_from(state: GameState, moves: &[MoveRecord]) -> Result<GameState, GameError> {
    let mut state = state;
    for record in moves {
        let expected = state.move_count();
        if record.move_index != expected {
            return Err(GameError::MoveOutOfOrder {
                expected,
                got: record.move_index,
            });
        }
        state = state.play_as(record.color, record.position())?.state;
    }
    debug!(moves = moves.len(), hash = state.state_hash(), "replay complete");
    Ok(state)
}
