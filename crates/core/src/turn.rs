//! Turn rotation, elimination and win detection
//!
//! A player is alive while their color owns at least one cell. Before the game
//! has really started nobody can be eliminated; [`EliminationRule`] decides
//! when that is.

use crate::board::Board;
use crate::game_state::Player;
use crate::types::PlayerColor;

/// When the elimination check starts to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EliminationRule {
    /// Everyone is alive while fewer than two units are on the board.
    #[default]
    OpeningGuard,
    /// As [`EliminationRule::OpeningGuard`], and additionally nobody is out
    /// until every player has made one move.
    FullRound,
}

impl EliminationRule {
    /// True while every player must be treated as alive.
    pub fn in_opening(self, board: &Board, move_count: u32, player_count: usize) -> bool {
        if board.total_units() < 2 {
            return true;
        }
        match self {
            EliminationRule::OpeningGuard => false,
            EliminationRule::FullRound => (move_count as usize) < player_count,
        }
    }
}

/// Whether `color` is still in the game.
pub fn is_alive(
    board: &Board,
    color: PlayerColor,
    rule: EliminationRule,
    move_count: u32,
    player_count: usize,
) -> bool {
    rule.in_opening(board, move_count, player_count) || board.owned_cells(color) > 0
}

/// Index of the next player to act, skipping eliminated players.
pub fn advance_turn(players: &[Player], current: usize, board: &Board) -> usize {
    advance_turn_with(players, current, board, EliminationRule::OpeningGuard, 0)
}

/// [`advance_turn`] under an explicit elimination rule.
///
/// The search gives up after one full lap; if nobody is alive the plain
/// successor of `current` is returned.
pub fn advance_turn_with(
    players: &[Player],
    current: usize,
    board: &Board,
    rule: EliminationRule,
    move_count: u32,
) -> usize {
    let n = players.len();
    if n == 0 {
        return current;
    }
    let mask = board.active_color_mask();
    let opening = rule.in_opening(board, move_count, n);
    let alive = |i: usize| opening || mask & (1 << players[i].color.index()) != 0;

    let mut next = (current + 1) % n;
    let mut attempts = 0;
    while !alive(next) && attempts < n {
        next = (next + 1) % n;
        attempts += 1;
    }
    next
}

/// The winner, if exactly one player still owns cells.
pub fn check_winner<'a>(board: &Board, players: &'a [Player]) -> Option<&'a Player> {
    check_winner_with(board, players, EliminationRule::OpeningGuard, 0)
}

/// [`check_winner`] under an explicit elimination rule.
pub fn check_winner_with<'a>(
    board: &Board,
    players: &'a [Player],
    rule: EliminationRule,
    move_count: u32,
) -> Option<&'a Player> {
    if rule.in_opening(board, move_count, players.len()) {
        return None;
    }
    let mask = board.active_color_mask();
    let mut owners = players
        .iter()
        .filter(|p| mask & (1 << p.color.index()) != 0);
    match (owners.next(), owners.next()) {
        (Some(winner), None) => Some(winner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::types::{BoardSize, Position};

    fn roster(colors: &[PlayerColor]) -> Vec<Player> {
        colors
            .iter()
            .enumerate()
            .map(|(i, c)| Player::new(i as u32, *c))
            .collect()
    }

    #[test]
    fn single_unit_keeps_everyone_alive() {
        let players = roster(&[PlayerColor::Red, PlayerColor::Blue]);
        let mut board = Board::new(BoardSize::new(9, 6));
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));

        assert_eq!(advance_turn(&players, 0, &board), 1);
        assert!(check_winner(&board, &players).is_none());
    }

    #[test]
    fn skips_eliminated_player() {
        let players = roster(&[PlayerColor::Red, PlayerColor::Blue, PlayerColor::Green]);
        let mut board = Board::new(BoardSize::new(12, 10));
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(5, 5), Cell::new(2, Some(PlayerColor::Green)));

        assert_eq!(advance_turn(&players, 0, &board), 2);
        assert_eq!(advance_turn(&players, 2, &board), 0);
    }

    #[test]
    fn bounded_when_nobody_alive() {
        let players = roster(&[PlayerColor::Red, PlayerColor::Blue, PlayerColor::Green]);
        let mut board = Board::new(BoardSize::new(12, 10));
        // only a color outside the roster owns cells
        board.set(Position::new(0, 0), Cell::new(2, Some(PlayerColor::Cyan)));

        let next = advance_turn(&players, 1, &board);
        assert!(next < players.len());
    }

    #[test]
    fn winner_when_one_color_remains() {
        let players = roster(&[PlayerColor::Red, PlayerColor::Blue]);
        let mut board = Board::new(BoardSize::new(9, 6));
        board.set(Position::new(1, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(0, 1), Cell::new(1, Some(PlayerColor::Red)));

        let winner = check_winner(&board, &players).map(|p| p.color);
        assert_eq!(winner, Some(PlayerColor::Red));
    }

    #[test]
    fn full_round_delays_elimination() {
        let players = roster(&[PlayerColor::Red, PlayerColor::Blue, PlayerColor::Green]);
        let mut board = Board::new(BoardSize::new(12, 10));
        board.set(Position::new(0, 0), Cell::new(2, Some(PlayerColor::Red)));

        // two moves made, Green has not played yet
        assert!(check_winner_with(&board, &players, EliminationRule::FullRound, 2).is_none());
        assert_eq!(
            advance_turn_with(&players, 1, &board, EliminationRule::FullRound, 2),
            2
        );
        assert_eq!(
            check_winner_with(&board, &players, EliminationRule::FullRound, 3).map(|p| p.color),
            Some(PlayerColor::Red)
        );
    }
}
