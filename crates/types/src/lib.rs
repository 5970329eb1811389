//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! from the simulation core, the terminal front-end and the wire protocol alike.
//!
//! # Board Dimensions
//!
//! The board size is a pure function of the player count:
//!
//! | Players | Rows × Cols |
//! |---------|-------------|
//! | 2 | 9 × 6 |
//! | 3-4 | 12 × 10 |
//! | 5-6 | 15 × 15 |
//! | 7-8 | 20 × 20 |
//!
//! # Pacing Constants
//!
//! Timing values are in milliseconds and only ever affect presentation:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep of the terminal loop |
//! | `WAVE_DELAY_MS` | 300 | Time one detonation wave stays on screen |
//!
//! # Examples
//!
//! ```
//! use chain_reaction_types::{board_size_for_player_count, BoardSize, PlayerColor};
//!
//! assert_eq!(board_size_for_player_count(2), Some(BoardSize::new(9, 6)));
//! assert_eq!(board_size_for_player_count(9), None);
//!
//! assert_eq!(PlayerColor::from_str("RED"), Some(PlayerColor::Red));
//! assert_eq!(PlayerColor::Cyan.as_str(), "cyan");
//! ```

use std::fmt;

/// Smallest supported roster.
pub const MIN_PLAYERS: usize = 2;

/// Largest supported roster (one per [`PlayerColor`]).
pub const MAX_PLAYERS: usize = 8;

/// Fixed timestep interval of the terminal loop (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// How long a single detonation wave is shown before the next one is applied.
pub const WAVE_DELAY_MS: u32 = 300;

/// Hard cap on waves per cascade; exceeding it is treated as an engine bug.
pub const DEFAULT_MAX_WAVES: usize = 10_000;

/// Player colors, in seat order.
///
/// Color is the durable gameplay identity: ownership is always compared by
/// color, never by connection or player id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Pink,
    Cyan,
}

impl PlayerColor {
    /// All colors in seat order.
    pub const ALL: [PlayerColor; MAX_PLAYERS] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
        PlayerColor::Pink,
        PlayerColor::Cyan,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_reaction_types::PlayerColor;
    ///
    /// assert_eq!(PlayerColor::from_str("blue"), Some(PlayerColor::Blue));
    /// assert_eq!(PlayerColor::from_str("Purple"), Some(PlayerColor::Purple));
    /// assert_eq!(PlayerColor::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(PlayerColor::Red),
            "blue" => Some(PlayerColor::Blue),
            "green" => Some(PlayerColor::Green),
            "yellow" => Some(PlayerColor::Yellow),
            "purple" => Some(PlayerColor::Purple),
            "orange" => Some(PlayerColor::Orange),
            "pink" => Some(PlayerColor::Pink),
            "cyan" => Some(PlayerColor::Cyan),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Green => "green",
            PlayerColor::Yellow => "yellow",
            PlayerColor::Purple => "purple",
            PlayerColor::Orange => "orange",
            PlayerColor::Pink => "pink",
            PlayerColor::Cyan => "cyan",
        }
    }

    /// Seat index of this color in [`PlayerColor::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grid coordinate, `row` from the top and `col` from the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSize {
    pub rows: usize,
    pub cols: usize,
}

impl BoardSize {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of cells on the board.
    pub const fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether `pos` lies inside `[0, rows) × [0, cols)`.
    pub const fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }
}

/// Board size for a roster of `players`.
///
/// Returns `None` outside the supported `2..=8` range.
pub fn board_size_for_player_count(players: usize) -> Option<BoardSize> {
    match players {
        2 => Some(BoardSize::new(9, 6)),
        3 | 4 => Some(BoardSize::new(12, 10)),
        5 | 6 => Some(BoardSize::new(15, 15)),
        7 | 8 => Some(BoardSize::new(20, 20)),
        _ => None,
    }
}

/// Cursor movement directions for interactive front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Front-end actions produced by the input layer.
///
/// These are presentation-level intents; only [`UiAction::Place`] reaches the
/// simulation, as a placement at the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Move the cursor one cell
    Cursor(Direction),
    /// Place a unit at the cursor
    Place,
    /// Skip the remaining wave animation
    SkipAnimation,
    /// Start a fresh game with the same roster
    Restart,
}

impl UiAction {
    /// Parse action from string (for scripted input)
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_reaction_types::{Direction, UiAction};
    ///
    /// assert_eq!(UiAction::from_str("left"), Some(UiAction::Cursor(Direction::Left)));
    /// assert_eq!(UiAction::from_str("place"), Some(UiAction::Place));
    /// assert_eq!(UiAction::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(UiAction::Cursor(Direction::Up)),
            "down" => Some(UiAction::Cursor(Direction::Down)),
            "left" => Some(UiAction::Cursor(Direction::Left)),
            "right" => Some(UiAction::Cursor(Direction::Right)),
            "place" => Some(UiAction::Place),
            "skip" => Some(UiAction::SkipAnimation),
            "restart" => Some(UiAction::Restart),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_size_table_matches_player_counts() {
        assert_eq!(board_size_for_player_count(2), Some(BoardSize::new(9, 6)));
        assert_eq!(board_size_for_player_count(3), Some(BoardSize::new(12, 10)));
        assert_eq!(board_size_for_player_count(4), Some(BoardSize::new(12, 10)));
        assert_eq!(board_size_for_player_count(5), Some(BoardSize::new(15, 15)));
        assert_eq!(board_size_for_player_count(6), Some(BoardSize::new(15, 15)));
        assert_eq!(board_size_for_player_count(7), Some(BoardSize::new(20, 20)));
        assert_eq!(board_size_for_player_count(8), Some(BoardSize::new(20, 20)));
        assert_eq!(board_size_for_player_count(0), None);
        assert_eq!(board_size_for_player_count(1), None);
        assert_eq!(board_size_for_player_count(9), None);
    }

    #[test]
    fn color_string_roundtrip_and_seat_order() {
        for (i, color) in PlayerColor::ALL.iter().enumerate() {
            assert_eq!(PlayerColor::from_str(color.as_str()), Some(*color));
            assert_eq!(color.index(), i);
        }
    }

    #[test]
    fn board_size_contains() {
        let size = BoardSize::new(9, 6);
        assert!(size.contains(Position::new(0, 0)));
        assert!(size.contains(Position::new(8, 5)));
        assert!(!size.contains(Position::new(9, 0)));
        assert!(!size.contains(Position::new(0, 6)));
        assert_eq!(size.area(), 54);
    }
}
