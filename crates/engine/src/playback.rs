//! Wall-clock pacing of a resolved cascade
//!
//! Playback never decides anything: it starts from the board right after the
//! placement and re-runs [`step`] once per wave delay, for exactly as many
//! waves as the resolved move produced. The board it ends on is the resolved
//! board.

use crate::core::cascade::step;
use crate::core::{Board, DetonationWave};
use crate::types::PlayerColor;

#[derive(Debug, Clone)]
pub struct WavePlayback {
    board: Board,
    mover: PlayerColor,
    remaining: usize,
    shown: usize,
    wave_delay_ms: u32,
    timer_ms: u32,
    last_wave: Option<DetonationWave>,
}

impl WavePlayback {
    /// `placed` is the board after the unit was added; `wave_count` is the
    /// length of the resolved wave log.
    pub fn new(placed: Board, mover: PlayerColor, wave_count: usize, wave_delay_ms: u32) -> Self {
        Self {
            board: placed,
            mover,
            remaining: wave_count,
            shown: 0,
            wave_delay_ms: wave_delay_ms.max(1),
            timer_ms: 0,
            last_wave: None,
        }
    }

    /// Board as it should be drawn right now.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The wave that produced the current board, for highlighting.
    pub fn last_wave(&self) -> Option<&DetonationWave> {
        self.last_wave.as_ref()
    }

    pub fn mover(&self) -> PlayerColor {
        self.mover
    }

    pub fn waves_shown(&self) -> usize {
        self.shown
    }

    pub fn waves_remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Advance by `elapsed_ms`. Returns true once every wave has been shown.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.is_done() {
            return true;
        }
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
        while self.timer_ms >= self.wave_delay_ms && !self.is_done() {
            self.timer_ms -= self.wave_delay_ms;
            self.advance();
        }
        self.is_done()
    }

    /// Show every remaining wave at once and return the final board.
    pub fn skip(&mut self) -> &Board {
        while !self.is_done() {
            self.advance();
        }
        &self.board
    }

    fn advance(&mut self) {
        let (next, wave) = step(&self.board, self.mover);
        self.board = next;
        self.last_wave = wave;
        self.remaining -= 1;
        self.shown += 1;
        if self.last_wave.is_none() {
            // settled early; nothing left to show
            self.remaining = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cascade::{place, resolve};
    use crate::core::Cell;
    use crate::types::{BoardSize, Position};

    fn chain_board() -> Board {
        let mut board = Board::new(BoardSize::new(9, 6));
        board.set(Position::new(0, 0), Cell::new(1, Some(PlayerColor::Red)));
        board.set(Position::new(0, 1), Cell::new(2, Some(PlayerColor::Red)));
        board
    }

    #[test]
    fn paced_playback_matches_resolution() {
        let placed = place(&chain_board(), Position::new(0, 0), PlayerColor::Red).unwrap();
        let outcome = resolve(placed.clone(), PlayerColor::Red).unwrap();
        assert_eq!(outcome.waves.len(), 2);

        let mut playback = WavePlayback::new(placed, PlayerColor::Red, 2, 300);
        assert!(!playback.tick(299));
        assert_eq!(playback.waves_shown(), 0);
        assert!(!playback.tick(1));
        assert_eq!(playback.last_wave(), Some(&outcome.waves[0]));
        assert!(playback.tick(300));
        assert_eq!(playback.board(), &outcome.board);
    }

    #[test]
    fn skip_shows_everything() {
        let placed = place(&chain_board(), Position::new(0, 0), PlayerColor::Red).unwrap();
        let outcome = resolve(placed.clone(), PlayerColor::Red).unwrap();

        let mut playback = WavePlayback::new(placed, PlayerColor::Red, outcome.waves.len(), 300);
        assert_eq!(playback.skip(), &outcome.board);
        assert!(playback.is_done());
    }
}
