//! Grid geometry - neighbor sets and detonation thresholds
//!
//! The threshold of a cell is defined as the size of its neighbor set, so the
//! two can never disagree: a detonating cell loses exactly as many units as it
//! hands out, which is what keeps the total unit count conserved.

use arrayvec::ArrayVec;

use crate::types::{BoardSize, Position};

/// Orthogonal neighbors of `pos` in up, down, left, right order.
///
/// Neighbors outside `[0, rows) × [0, cols)` are omitted.
///
/// # Examples
///
/// ```
/// use chain_reaction_core::geometry::neighbors;
/// use chain_reaction_core::types::{BoardSize, Position};
///
/// let size = BoardSize::new(9, 6);
/// let n = neighbors(Position::new(0, 0), size);
/// assert_eq!(n.as_slice(), &[Position::new(1, 0), Position::new(0, 1)]);
/// assert_eq!(neighbors(Position::new(4, 3), size).len(), 4);
/// ```
#[inline]
pub fn neighbors(pos: Position, size: BoardSize) -> ArrayVec<Position, 4> {
    let mut out = ArrayVec::new();
    if pos.row > 0 {
        out.push(Position::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < size.rows {
        out.push(Position::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Position::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < size.cols {
        out.push(Position::new(pos.row, pos.col + 1));
    }
    out
}

/// Unit count at which the cell at `pos` detonates.
///
/// Corners: 2, edges: 3, interior: 4.
#[inline]
pub fn detonation_threshold(pos: Position, size: BoardSize) -> u32 {
    neighbors(pos, size).len() as u32
}
