//! Game state module - roster, board and turn bookkeeping
//!
//! A `GameState` is a value: each accepted move produces a new state through
//! [`GameState::play_as`] and the previous one is left as it was, so a caller
//! can keep it around for animation or rollback.

use std::hash::Hasher;

use crate::board::Board;
use crate::cascade::{apply_move_with, CascadeOptions, DetonationWave};
use crate::error::GameError;
use crate::turn::{advance_turn_with, check_winner_with, is_alive, EliminationRule};
use crate::types::{
    board_size_for_player_count, PlayerColor, Position, MAX_PLAYERS, MIN_PLAYERS,
};

/// A seat in the game. Ownership is always compared by `color`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    pub id: u32,
    pub color: PlayerColor,
    pub name: String,
    pub is_alive: bool,
}

impl Player {
    pub fn new(id: u32, color: PlayerColor) -> Self {
        Self {
            id,
            color,
            name: format!("Player {}", id + 1),
            is_alive: true,
        }
    }
}

/// One accepted move, as stored in a move log or sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    /// Zero-based, strictly increasing per game.
    pub move_index: u32,
    pub row: usize,
    pub col: usize,
    pub color: PlayerColor,
}

impl MoveRecord {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Result of one accepted move.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub record: MoveRecord,
    pub waves: Vec<DetonationWave>,
    /// Colors that were alive before the move and are not after it.
    pub eliminated: Vec<PlayerColor>,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    players: Vec<Player>,
    current_player_index: usize,
    winner: Option<PlayerColor>,
    is_animating: bool,
    /// Number of accepted moves; also the index of the next one.
    move_count: u32,
    rule: EliminationRule,
    cascade: CascadeOptions,
}

impl GameState {
    /// Start a game for `players` on the board size their count calls for.
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        let size = board_size_for_player_count(players.len()).ok_or_else(|| {
            GameError::InvalidRoster(format!(
                "{} players (supported: {MIN_PLAYERS}..={MAX_PLAYERS})",
                players.len()
            ))
        })?;
        Self::check_unique_colors(&players)?;

        Ok(Self {
            board: Board::new(size),
            players,
            current_player_index: 0,
            winner: None,
            is_animating: false,
            move_count: 0,
            rule: EliminationRule::default(),
            cascade: CascadeOptions::session(),
        })
    }

    /// `count` players seated in color order.
    pub fn with_default_players(count: usize) -> Result<Self, GameError> {
        if count > MAX_PLAYERS {
            return Err(GameError::InvalidRoster(format!(
                "{count} players (supported: {MIN_PLAYERS}..={MAX_PLAYERS})"
            )));
        }
        let players = PlayerColor::ALL[..count]
            .iter()
            .enumerate()
            .map(|(i, c)| Player::new(i as u32, *c))
            .collect();
        Self::new(players)
    }

    /// Rebuild a state from an authoritative snapshot.
    ///
    /// Winner and per-player `is_alive` flags are recomputed from the board.
    pub fn restore(
        board: Board,
        players: Vec<Player>,
        current_player_index: usize,
        move_count: u32,
        rule: EliminationRule,
    ) -> Result<Self, GameError> {
        let expected = board_size_for_player_count(players.len()).ok_or_else(|| {
            GameError::InvalidRoster(format!("{} players", players.len()))
        })?;
        if board.size() != expected {
            return Err(GameError::InvalidBoard(format!(
                "{}x{} board for {} players, expected {}x{}",
                board.rows(),
                board.cols(),
                players.len(),
                expected.rows,
                expected.cols
            )));
        }
        if current_player_index >= players.len() {
            return Err(GameError::InvalidRoster(format!(
                "current player index {current_player_index} out of range"
            )));
        }
        Self::check_unique_colors(&players)?;

        let mut state = Self {
            board,
            players,
            current_player_index,
            winner: None,
            is_animating: false,
            move_count,
            rule,
            cascade: CascadeOptions::session(),
        };
        state.refresh_standings();
        Ok(state)
    }

    fn check_unique_colors(players: &[Player]) -> Result<(), GameError> {
        let mut seen = 0u8;
        for p in players {
            let bit = 1 << p.color.index();
            if seen & bit != 0 {
                return Err(GameError::InvalidRoster(format!(
                    "color {} is used twice",
                    p.color
                )));
            }
            seen |= bit;
        }
        Ok(())
    }

    pub fn with_rule(mut self, rule: EliminationRule) -> Self {
        self.rule = rule;
        self.refresh_standings();
        self
    }

    /// Copy of this state with the animation flag set.
    pub fn with_animating(mut self, animating: bool) -> Self {
        self.is_animating = animating;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn winner(&self) -> Option<&Player> {
        let color = self.winner?;
        self.players.iter().find(|p| p.color == color)
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn rule(&self) -> EliminationRule {
        self.rule
    }

    pub fn cascade_options(&self) -> CascadeOptions {
        self.cascade
    }

    /// Play for whoever's turn it is.
    pub fn play(&self, pos: Position) -> Result<Transition, GameError> {
        self.play_as(self.current_player().color, pos)
    }

    /// Play `pos` for `color`, producing the next state.
    ///
    /// Rejections leave `self` untouched and the turn where it was.
    pub fn play_as(&self, color: PlayerColor, pos: Position) -> Result<Transition, GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        if self.is_animating {
            return Err(GameError::AnimationInProgress);
        }
        let expected = self.current_player().color;
        if color != expected {
            return Err(GameError::NotYourTurn {
                expected,
                got: color,
            });
        }

        let outcome = apply_move_with(&self.board, pos, color, self.cascade)?;
        let record = MoveRecord {
            move_index: self.move_count,
            row: pos.row,
            col: pos.col,
            color,
        };

        let mut next = Self {
            board: outcome.board,
            players: self.players.clone(),
            current_player_index: self.current_player_index,
            winner: None,
            is_animating: false,
            move_count: self.move_count + 1,
            rule: self.rule,
            cascade: self.cascade,
        };
        next.refresh_standings();
        if !next.is_finished() {
            next.current_player_index = advance_turn_with(
                &next.players,
                next.current_player_index,
                &next.board,
                next.rule,
                next.move_count,
            );
        }

        let eliminated = self
            .players
            .iter()
            .zip(&next.players)
            .filter(|(before, after)| before.is_alive && !after.is_alive)
            .map(|(p, _)| p.color)
            .collect();

        Ok(Transition {
            state: next,
            record,
            waves: outcome.waves,
            eliminated,
        })
    }

    fn refresh_standings(&mut self) {
        let count = self.players.len();
        for i in 0..count {
            let color = self.players[i].color;
            self.players[i].is_alive =
                is_alive(&self.board, color, self.rule, self.move_count, count);
        }
        self.winner = check_winner_with(&self.board, &self.players, self.rule, self.move_count)
            .map(|p| p.color);
    }

    /// Stable hash of everything peers must agree on.
    ///
    /// Covers the board, turn index, move count and winner; player names and
    /// the animation flag are presentation only.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = Fnv1aHasher::new();
        hasher.write(&(self.board.rows() as u32).to_le_bytes());
        hasher.write(&(self.board.cols() as u32).to_le_bytes());
        for cell in self.board.cells() {
            hasher.write(&cell.count.to_le_bytes());
            hasher.write(&[color_code(cell.owner)]);
        }
        hasher.write(&(self.current_player_index as u32).to_le_bytes());
        hasher.write(&self.move_count.to_le_bytes());
        hasher.write(&[color_code(self.winner)]);
        hasher.finish()
    }
}

fn color_code(color: Option<PlayerColor>) -> u8 {
    color.map_or(0, |c| c.index() as u8 + 1)
}

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed across Rust versions or platforms.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::types::BoardSize;

    #[test]
    fn test_new_game_uses_table_size() {
        let state = GameState::with_default_players(3).unwrap();
        assert_eq!(state.board().size(), BoardSize::new(12, 10));
        assert_eq!(state.current_player().color, PlayerColor::Red);
        assert_eq!(state.players()[2].color, PlayerColor::Green);
        assert!(!state.is_finished());
    }

    #[test]
    fn test_roster_validation() {
        assert!(matches!(
            GameState::with_default_players(1),
            Err(GameError::InvalidRoster(_))
        ));
        assert!(matches!(
            GameState::with_default_players(9),
            Err(GameError::InvalidRoster(_))
        ));
        let dup = vec![
            Player::new(0, PlayerColor::Red),
            Player::new(1, PlayerColor::Red),
        ];
        assert!(matches!(GameState::new(dup), Err(GameError::InvalidRoster(_))));
    }

    #[test]
    fn test_play_advances_turn_and_keeps_previous_state() {
        let state = GameState::with_default_players(2).unwrap();
        let t = state.play(Position::new(0, 0)).unwrap();

        assert_eq!(state.move_count(), 0);
        assert_eq!(state.board().total_units(), 0);
        assert_eq!(t.state.move_count(), 1);
        assert_eq!(t.state.current_player().color, PlayerColor::Blue);
        assert_eq!(t.record.move_index, 0);
        assert!(t.waves.is_empty());
        assert!(t.eliminated.is_empty());
    }

    #[test]
    fn test_rejections_do_not_advance() {
        let state = GameState::with_default_players(2).unwrap();
        let t = state.play(Position::new(0, 0)).unwrap();

        let err = t.state.play(Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, GameError::InvalidMove(_)));
        let err = t
            .state
            .play_as(PlayerColor::Red, Position::new(4, 4))
            .unwrap_err();
        assert_eq!(
            err,
            GameError::NotYourTurn {
                expected: PlayerColor::Blue,
                got: PlayerColor::Red
            }
        );
        let animating = t.state.clone().with_animating(true);
        assert_eq!(
            animating.play(Position::new(4, 4)).unwrap_err(),
            GameError::AnimationInProgress
        );
    }

    #[test]
    fn test_capture_finishes_game() {
        let state = GameState::with_default_players(2).unwrap();
        let s = state.play(Position::new(0, 0)).unwrap().state; // red
        let s = s.play(Position::new(0, 1)).unwrap().state; // blue, next to red corner
        let s = s.play(Position::new(8, 5)).unwrap().state; // red elsewhere
        let s = s.play(Position::new(0, 1)).unwrap().state; // blue 2 at edge
        let t = s.play(Position::new(0, 0)).unwrap(); // red corner detonates into blue

        assert!(t.state.is_finished());
        assert_eq!(t.state.winner().map(|p| p.color), Some(PlayerColor::Red));
        assert_eq!(t.eliminated, vec![PlayerColor::Blue]);
        assert!(!t.state.players()[1].is_alive);
        assert_eq!(
            t.state.play(Position::new(4, 4)).unwrap_err(),
            GameError::GameFinished
        );
    }

    #[test]
    fn test_restore_recomputes_winner() {
        let mut board = Board::new(BoardSize::new(9, 6));
        board.set(Position::new(4, 3), Cell::new(2, Some(PlayerColor::Blue)));
        let players = vec![
            Player::new(0, PlayerColor::Red),
            Player::new(1, PlayerColor::Blue),
        ];
        let state =
            GameState::restore(board, players, 0, 4, EliminationRule::OpeningGuard).unwrap();
        assert_eq!(state.winner().map(|p| p.color), Some(PlayerColor::Blue));
        assert!(!state.players()[0].is_alive);
    }

    #[test]
    fn test_state_hash_tracks_board_and_turn() {
        let state = GameState::with_default_players(2).unwrap();
        let a = state.play(Position::new(0, 0)).unwrap().state;
        let b = state.play(Position::new(0, 1)).unwrap().state;
        assert_ne!(a.state_hash(), b.state_hash());
        assert_eq!(a.state_hash(), a.clone().with_animating(true).state_hash());
        assert_ne!(state.state_hash(), a.state_hash());
    }
}
