//! Cascade engine - resolves one placement into a settled board
//!
//! Resolution is a sequence of waves. Each wave scans the whole board for
//! cells at or above their threshold and detonates all of them at once from a
//! single snapshot: every origin loses its threshold and every neighbor gains
//! one unit and is captured by the mover of the triggering placement. The
//! wave log is returned alongside the final board for presentation layers.
//!
//! The single wave is exposed as [`step`]; [`resolve_with`] threads the board
//! and the wave log through it until the scan comes back empty.

use tracing::error;

use crate::board::{Board, Cell};
use crate::error::{CascadeError, MoveError};
use crate::geometry::{detonation_threshold, neighbors};
use crate::rules::validate_move;
use crate::types::{PlayerColor, Position, DEFAULT_MAX_WAVES};

/// Cells that detonated together in one step, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DetonationWave {
    pub origins: Vec<Position>,
}

impl DetonationWave {
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.origins.binary_search(&pos).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.origins.iter()
    }
}

/// A fully resolved placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub waves: Vec<DetonationWave>,
}

/// Knobs for [`resolve_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Waves allowed before the cascade is treated as runaway.
    pub max_waves: usize,
    /// Stop once a single color owns every occupied cell.
    ///
    /// Only checked after at least one wave and with two or more units on
    /// the board, so an opening placement never halts anything.
    pub halt_on_sole_owner: bool,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            max_waves: DEFAULT_MAX_WAVES,
            halt_on_sole_owner: false,
        }
    }
}

impl CascadeOptions {
    /// Options used by game sessions: the game is decided as soon as one color
    /// remains, so there is nothing left to resolve.
    pub fn session() -> Self {
        Self {
            halt_on_sole_owner: true,
            ..Self::default()
        }
    }
}

/// Positions at or above their threshold, row-major.
pub fn unstable_cells(board: &Board) -> Vec<Position> {
    let size = board.size();
    board
        .iter()
        .filter(|(pos, cell)| cell.count > 0 && cell.count >= detonation_threshold(*pos, size))
        .map(|(pos, _)| pos)
        .collect()
}

/// Detonate all `origins` simultaneously.
///
/// Reads come from `board` and writes go to a fresh copy, so the order of
/// `origins` cannot affect the result.
fn detonate(board: &Board, origins: &[Position], mover: PlayerColor) -> Board {
    let size = board.size();
    let cols = size.cols;
    let mut next = board.clone();
    let mut captured = vec![false; size.area()];

    {
        let cells = next.cells_mut();
        for &pos in origins {
            let idx = pos.row * cols + pos.col;
            cells[idx].count -= detonation_threshold(pos, size);
        }
        for &pos in origins {
            for n in neighbors(pos, size) {
                let idx = n.row * cols + n.col;
                cells[idx].count += 1;
                captured[idx] = true;
            }
        }
        for (cell, captured) in cells.iter_mut().zip(captured) {
            if cell.count == 0 {
                *cell = Cell::EMPTY;
            } else if captured {
                cell.owner = Some(mover);
            }
        }
    }
    next
}

/// One wave of the cascade.
///
/// Returns the next board and the wave that produced it, or an unchanged copy
/// and `None` when `board` is already settled.
pub fn step(board: &Board, mover: PlayerColor) -> (Board, Option<DetonationWave>) {
    let origins = unstable_cells(board);
    if origins.is_empty() {
        return (board.clone(), None);
    }
    let next = detonate(board, &origins, mover);
    (next, Some(DetonationWave { origins }))
}

/// Place one unit for `color` at `pos` on a copy of `board`.
pub fn place(board: &Board, pos: Position, color: PlayerColor) -> Result<Board, MoveError> {
    validate_move(board, pos, color)?;
    let mut next = board.clone();
    next.place_unit(pos, color);
    Ok(next)
}

/// Run a placed board to settlement with default options.
pub fn resolve(board: Board, mover: PlayerColor) -> Result<MoveOutcome, CascadeError> {
    resolve_with(board, mover, CascadeOptions::default())
}

/// Run a placed board to settlement.
pub fn resolve_with(
    board: Board,
    mover: PlayerColor,
    options: CascadeOptions,
) -> Result<MoveOutcome, CascadeError> {
    let mut waves: Vec<DetonationWave> = Vec::new();
    let mut current = board;

    loop {
        if options.halt_on_sole_owner
            && !waves.is_empty()
            && current.total_units() >= 2
            && current.sole_owner().is_some()
        {
            return Ok(MoveOutcome {
                board: current,
                waves,
            });
        }

        let origins = unstable_cells(&current);
        if origins.is_empty() {
            return Ok(MoveOutcome {
                board: current,
                waves,
            });
        }
        if waves.len() >= options.max_waves {
            error!(
                limit = options.max_waves,
                pending = origins.len(),
                %mover,
                "cascade exceeded wave limit"
            );
            return Err(CascadeError::WaveLimitExceeded {
                limit: options.max_waves,
            });
        }

        current = detonate(&current, &origins, mover);
        waves.push(DetonationWave { origins });
    }
}

/// Validate, place and resolve one move.
///
/// The input board is never modified.
pub fn apply_move(
    board: &Board,
    pos: Position,
    color: PlayerColor,
) -> Result<MoveOutcome, CascadeError> {
    apply_move_with(board, pos, color, CascadeOptions::default())
}

pub fn apply_move_with(
    board: &Board,
    pos: Position,
    color: PlayerColor,
    options: CascadeOptions,
) -> Result<MoveOutcome, CascadeError> {
    let placed = place(board, pos, color)?;
    resolve_with(placed, color, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardSize;

    fn small() -> Board {
        Board::new(BoardSize::new(9, 6))
    }

    #[test]
    fn placement_without_cascade() {
        let outcome = apply_move(&small(), Position::new(0, 0), PlayerColor::Red).unwrap();
        assert!(outcome.waves.is_empty());
        assert_eq!(
            outcome.board.get(Position::new(0, 0)),
            Some(Cell::new(1, Some(PlayerColor::Red)))
        );
    }

    #[test]
    fn corner_detonation() {
        let mut board = small();
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        let outcome = apply_move(&board, Position::new(0, 0), PlayerColor::Red).unwrap();

        assert_eq!(outcome.waves.len(), 1);
        assert_eq!(outcome.waves[0].origins, vec![Position::new(0, 0)]);
        assert_eq!(outcome.board.get(Position::new(0, 0)), Some(Cell::EMPTY));
        assert_eq!(
            outcome.board.get(Position::new(1, 0)),
            Some(Cell::new(1, Some(PlayerColor::Red)))
        );
        assert_eq!(
            outcome.board.get(Position::new(0, 1)),
            Some(Cell::new(1, Some(PlayerColor::Red)))
        );
        // input untouched
        assert_eq!(board.total_units(), 1);
    }

    #[test]
    fn simultaneous_origins_read_one_snapshot() {
        // On a 1x2 board both cells have threshold 1.
        let mut board = Board::new(BoardSize::new(1, 2));
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(0, 1), Cell::new(1, Some(PlayerColor::Red)));
        let (next, wave) = step(&board, PlayerColor::Red);
        assert_eq!(
            wave,
            Some(DetonationWave {
                origins: vec![Position::new(0, 0), Position::new(0, 1)]
            })
        );
        // each loses 1 and gains 1 from the other
        let red = Some(Cell::new(1, Some(PlayerColor::Red)));
        assert_eq!(next.get(Position::new(0, 0)), red);
        assert_eq!(next.get(Position::new(0, 1)), red);
    }

    #[test]
    fn step_on_settled_board_is_noop() {
        let mut board = small();
        board.set(Position::new(4, 3), Cell::new(3, Some(PlayerColor::Blue)));
        let (next, wave) = step(&board, PlayerColor::Red);
        assert!(wave.is_none());
        assert_eq!(next, board);
        assert!(unstable_cells(&board).is_empty());
    }

    #[test]
    fn wave_limit_aborts() {
        let mut board = small();
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(0, 1), Cell::new(2, Some(PlayerColor::Red)));
        let options = CascadeOptions {
            max_waves: 1,
            halt_on_sole_owner: false,
        };
        let err = apply_move_with(&board, Position::new(0, 0), PlayerColor::Red, options)
            .unwrap_err();
        assert_eq!(err, CascadeError::WaveLimitExceeded { limit: 1 });

        let outcome = apply_move(&board, Position::new(0, 0), PlayerColor::Red).unwrap();
        assert_eq!(outcome.waves.len(), 2);
    }

    #[test]
    fn halt_on_sole_owner_stops_after_capture() {
        let mut board = small();
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(0, 1), Cell::new(2, Some(PlayerColor::Blue)));
        let full = apply_move(&board, Position::new(0, 0), PlayerColor::Red).unwrap();
        assert_eq!(full.waves.len(), 2);

        let halted = apply_move_with(
            &board,
            Position::new(0, 0),
            PlayerColor::Red,
            CascadeOptions::session(),
        )
        .unwrap();
        assert_eq!(halted.waves.len(), 1);
        assert_eq!(halted.board.sole_owner(), Some(PlayerColor::Red));
        assert_eq!(halted.board.total_units(), full.board.total_units());
    }

    #[test]
    fn invalid_move_is_rejected_untouched() {
        let mut board = small();
        board.set(Position::new(2, 2), Cell::new(1, Some(PlayerColor::Blue)));
        let err = apply_move(&board, Position::new(2, 2), PlayerColor::Red).unwrap_err();
        assert!(matches!(err, CascadeError::InvalidMove(MoveError::OwnedByOther { .. })));
    }
}
