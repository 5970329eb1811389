//! Move validation
//!
//! A placement is legal iff it is on the board and the target cell is either
//! empty or already owned by the mover. The validator is stateless: whether a
//! cascade is still resolving is the caller's concern.

use crate::board::Board;
use crate::error::MoveError;
use crate::types::{PlayerColor, Position};

/// Check a proposed placement without touching the board.
pub fn validate_move(board: &Board, pos: Position, color: PlayerColor) -> Result<(), MoveError> {
    let Some(cell) = board.get(pos) else {
        return Err(MoveError::OutOfBounds {
            pos,
            rows: board.rows(),
            cols: board.cols(),
        });
    };
    match cell.owner {
        Some(owner) if owner != color => Err(MoveError::OwnedByOther { pos, owner }),
        _ => Ok(()),
    }
}

/// Boolean form of [`validate_move`].
pub fn is_valid_move(board: &Board, pos: Position, color: PlayerColor) -> bool {
    validate_move(board, pos, color).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::types::BoardSize;

    fn board() -> Board {
        let mut board = Board::new(BoardSize::new(9, 6));
        board.set(Position::new(2, 2), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(3, 3), Cell::new(2, Some(PlayerColor::Blue)));
        board
    }

    #[test]
    fn empty_and_own_cells_are_legal() {
        let board = board();
        assert!(is_valid_move(&board, Position::new(0, 0), PlayerColor::Red));
        assert!(is_valid_move(&board, Position::new(2, 2), PlayerColor::Red));
        assert!(is_valid_move(&board, Position::new(3, 3), PlayerColor::Blue));
    }

    #[test]
    fn foreign_cells_are_rejected() {
        let board = board();
        assert_eq!(
            validate_move(&board, Position::new(3, 3), PlayerColor::Red),
            Err(MoveError::OwnedByOther {
                pos: Position::new(3, 3),
                owner: PlayerColor::Blue
            })
        );
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let board = board();
        assert!(matches!(
            validate_move(&board, Position::new(9, 0), PlayerColor::Red),
            Err(MoveError::OutOfBounds { rows: 9, cols: 6, .. })
        ));
        assert!(!is_valid_move(&board, Position::new(0, 6), PlayerColor::Red));
    }
}
