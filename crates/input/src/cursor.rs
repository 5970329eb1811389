//! Board cursor for interactive play.

use crate::types::{BoardSize, Direction, Position};

/// Selected cell, always inside the board it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    size: BoardSize,
}

impl Cursor {
    /// Start centred on the board.
    pub fn new(size: BoardSize) -> Self {
        Self {
            pos: Position::new(size.rows / 2, size.cols / 2),
            size,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Move one cell, stopping at the edges.
    pub fn step(&mut self, dir: Direction) {
        let Position { row, col } = self.pos;
        self.pos = match dir {
            Direction::Up => Position::new(row.saturating_sub(1), col),
            Direction::Down => Position::new((row + 1).min(self.size.rows.saturating_sub(1)), col),
            Direction::Left => Position::new(row, col.saturating_sub(1)),
            Direction::Right => Position::new(row, (col + 1).min(self.size.cols.saturating_sub(1))),
        };
    }
}
