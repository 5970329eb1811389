//! Board module - manages the game grid
//!
//! The board is a `rows × cols` grid where each cell holds a unit count and an
//! optional owning color. Cells live in a flat row-major `Vec` so a board is a
//! plain value: cloning it is how every speculative or animated copy is made.
//! Coordinates: `(row, col)` where row 0 is the top edge and col 0 the left edge.

use crate::error::GameError;
use crate::types::{BoardSize, PlayerColor, Position};

/// A single grid cell.
///
/// Invariant: `owner.is_none() == (count == 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub count: u32,
    pub owner: Option<PlayerColor>,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        count: 0,
        owner: None,
    };

    pub fn new(count: u32, owner: Option<PlayerColor>) -> Self {
        Self { count, owner }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn is_consistent(&self) -> bool {
        self.owner.is_none() == (self.count == 0)
    }
}

/// The game board using flat array storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: BoardSize,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![Cell::EMPTY; size.area()],
        }
    }

    /// Rebuild a board from row-major cells, e.g. as received from an authority.
    ///
    /// Rejects a cell list of the wrong length and any cell that breaks the
    /// owner/count invariant.
    pub fn from_cells(size: BoardSize, cells: Vec<Cell>) -> Result<Self, GameError> {
        if cells.len() != size.area() {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells for a {}x{} board, got {}",
                size.area(),
                size.rows,
                size.cols,
                cells.len()
            )));
        }
        if let Some(i) = cells.iter().position(|c| !c.is_consistent()) {
            let pos = Position::new(i / size.cols, i % size.cols);
            return Err(GameError::InvalidBoard(format!(
                "cell {pos} has count {} but owner {:?}",
                cells[i].count, cells[i].owner
            )));
        }
        Ok(Self { size, cells })
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if !self.size.contains(pos) {
            return None;
        }
        Some(pos.row * self.size.cols + pos.col)
    }

    #[inline(always)]
    pub(crate) fn position_of(&self, idx: usize) -> Position {
        Position::new(idx / self.size.cols, idx % self.size.cols)
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.rows
    }

    pub fn cols(&self) -> usize {
        self.size.cols
    }

    /// Get cell at `pos`
    /// Returns None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Overwrite the cell at `pos`.
    ///
    /// Returns false if out of bounds or if `cell` breaks the owner/count
    /// invariant; the board is left untouched in that case.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        if !cell.is_consistent() {
            return false;
        }
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Add one unit owned by `color` at `pos`.
    pub(crate) fn place_unit(&mut self, pos: Position, color: PlayerColor) -> bool {
        match self.index(pos) {
            Some(idx) => {
                let cell = &mut self.cells[idx];
                cell.count += 1;
                cell.owner = Some(color);
                true
            }
            None => false,
        }
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterate `(position, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.position_of(i), *c))
    }

    /// Sum of unit counts over the whole board.
    pub fn total_units(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.count)).sum()
    }

    /// Number of cells owned by `color`.
    pub fn owned_cells(&self, color: PlayerColor) -> usize {
        self.cells
            .iter()
            .filter(|c| c.owner == Some(color))
            .count()
    }

    /// Units held by `color` across all its cells.
    pub fn units_of(&self, color: PlayerColor) -> u64 {
        self.cells
            .iter()
            .filter(|c| c.owner == Some(color))
            .map(|c| u64::from(c.count))
            .sum()
    }

    /// Colors owning at least one cell, as a bitmask over [`PlayerColor::index`].
    pub fn active_color_mask(&self) -> u8 {
        self.cells
            .iter()
            .filter_map(|c| c.owner)
            .fold(0u8, |mask, color| mask | (1 << color.index()))
    }

    /// The only color on the board, if exactly one color owns cells.
    pub fn sole_owner(&self) -> Option<PlayerColor> {
        let mask = self.active_color_mask();
        if mask.count_ones() != 1 {
            return None;
        }
        PlayerColor::ALL
            .iter()
            .copied()
            .find(|c| mask & (1 << c.index()) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(BoardSize::new(9, 6));
        assert_eq!(board.index(Position::new(0, 0)), Some(0));
        assert_eq!(board.index(Position::new(0, 5)), Some(5));
        assert_eq!(board.index(Position::new(1, 0)), Some(6));
        assert_eq!(board.index(Position::new(8, 5)), Some(53));
        assert_eq!(board.index(Position::new(9, 0)), None);
        assert_eq!(board.index(Position::new(0, 6)), None);
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(BoardSize::new(12, 10));
        assert_eq!(board.cells().len(), 120);
        assert!(board.cells().iter().all(|c| *c == Cell::EMPTY));
        assert_eq!(board.total_units(), 0);
        assert_eq!(board.active_color_mask(), 0);
    }

    #[test]
    fn test_set_rejects_inconsistent_cells() {
        let mut board = Board::new(BoardSize::new(9, 6));
        assert!(!board.set(Position::new(0, 0), Cell::new(2, None)));
        assert!(!board.set(Position::new(0, 0), Cell::new(0, Some(PlayerColor::Red))));
        assert!(!board.set(Position::new(9, 0), Cell::new(1, Some(PlayerColor::Red))));
        assert!(board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red))));
        assert_eq!(
            board.get(Position::new(0, 0)),
            Some(Cell::new(1, Some(PlayerColor::Red)))
        );
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut board = Board::new(BoardSize::new(9, 6));
        let snapshot = board.clone();
        board.place_unit(Position::new(2, 2), PlayerColor::Blue);
        assert_eq!(snapshot.total_units(), 0);
        assert_eq!(board.total_units(), 1);
    }

    #[test]
    fn test_from_cells_validates() {
        let size = BoardSize::new(2, 2);
        assert!(Board::from_cells(size, vec![Cell::EMPTY; 3]).is_err());

        let mut cells = vec![Cell::EMPTY; 4];
        cells[3] = Cell::new(1, None);
        assert!(Board::from_cells(size, cells).is_err());

        let mut cells = vec![Cell::EMPTY; 4];
        cells[3] = Cell::new(1, Some(PlayerColor::Green));
        let board = Board::from_cells(size, cells).unwrap();
        assert_eq!(board.owned_cells(PlayerColor::Green), 1);
    }

    #[test]
    fn test_sole_owner() {
        let mut board = Board::new(BoardSize::new(9, 6));
        assert_eq!(board.sole_owner(), None);
        board.place_unit(Position::new(0, 0), PlayerColor::Red);
        assert_eq!(board.sole_owner(), Some(PlayerColor::Red));
        board.place_unit(Position::new(3, 3), PlayerColor::Yellow);
        assert_eq!(board.sole_owner(), None);
        assert_eq!(board.units_of(PlayerColor::Yellow), 1);
    }
}
