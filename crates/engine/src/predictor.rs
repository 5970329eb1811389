//! Client-side visual predictor
//!
//! Applies moves received from a remote authority with the same core rules
//! and animates them locally. An authoritative state that arrives while an
//! animation is running is queued and swapped in once the animation ends; the
//! predicted state is then discarded, never merged.

use tracing::{debug, warn};

use crate::core::cascade::place;
use crate::core::{Board, GameError, GameState, MoveRecord};
use crate::playback::WavePlayback;
use crate::types::WAVE_DELAY_MS;

#[derive(Debug, Clone)]
pub struct VisualPredictor {
    state: GameState,
    playback: Option<WavePlayback>,
    queued: Option<GameState>,
    wave_delay_ms: u32,
}

impl VisualPredictor {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            playback: None,
            queued: None,
            wave_delay_ms: WAVE_DELAY_MS,
        }
    }

    pub fn with_wave_delay(mut self, wave_delay_ms: u32) -> Self {
        self.wave_delay_ms = wave_delay_ms;
        self
    }

    /// Latest predicted (or adopted authoritative) state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Board to draw right now.
    pub fn board(&self) -> &Board {
        match &self.playback {
            Some(p) => p.board(),
            None => self.state.board(),
        }
    }

    pub fn playback(&self) -> Option<&WavePlayback> {
        self.playback.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.playback.is_some()
    }

    pub fn has_queued_state(&self) -> bool {
        self.queued.is_some()
    }

    /// Apply a move relayed by the authority.
    ///
    /// Returns `Ok(false)` for a move that was already applied. A running
    /// animation is fast-forwarded first so moves are applied in order.
    pub fn on_remote_move(&mut self, record: MoveRecord) -> Result<bool, GameError> {
        let expected = self.state.move_count();
        if record.move_index < expected {
            debug!(
                move_index = record.move_index,
                expected, "ignoring stale remote move"
            );
            return Ok(false);
        }
        if record.move_index > expected {
            warn!(
                move_index = record.move_index,
                expected, "remote move skips ahead"
            );
            return Err(GameError::MoveOutOfOrder {
                expected,
                got: record.move_index,
            });
        }

        self.finish_animation();
        if record.move_index < self.state.move_count() {
            // the queued authoritative state already covers this move
            return Ok(false);
        }

        let pos = record.position();
        let transition = self.state.play_as(record.color, pos)?;
        let placed = place(self.state.board(), pos, record.color)?;
        if self.wave_delay_ms > 0 && !transition.waves.is_empty() {
            self.playback = Some(WavePlayback::new(
                placed,
                record.color,
                transition.waves.len(),
                self.wave_delay_ms,
            ));
        }
        self.state = transition.state;
        Ok(true)
    }

    /// Adopt an authoritative state, or queue it while animating.
    pub fn on_authoritative_state(&mut self, state: GameState) {
        let newest = self
            .queued
            .as_ref()
            .map_or(self.state.move_count(), |q| q.move_count().max(self.state.move_count()));
        if state.move_count() < newest {
            debug!(
                move_count = state.move_count(),
                newest,
                "ignoring stale authoritative state"
            );
            return;
        }
        if self.is_animating() {
            self.queued = Some(state);
        } else {
            self.adopt(state);
        }
    }

    /// Advance the animation; adopts a queued state when it ends.
    pub fn tick(&mut self, elapsed_ms: u32) {
        let done = match self.playback.as_mut() {
            Some(p) => p.tick(elapsed_ms),
            None => return,
        };
        if done {
            self.finish_animation();
        }
    }

    fn finish_animation(&mut self) {
        self.playback = None;
        if let Some(state) = self.queued.take() {
            self.adopt(state);
        }
    }

    fn adopt(&mut self, state: GameState) {
        if state.move_count() == self.state.move_count()
            && state.state_hash() != self.state.state_hash()
        {
            warn!(
                move_count = state.move_count(),
                predicted = self.state.state_hash(),
                authoritative = state.state_hash(),
                "prediction diverged from authority"
            );
        }
        self.state = state.with_animating(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlayerColor, Position};

    fn record(move_index: u32, row: usize, col: usize, color: PlayerColor) -> MoveRecord {
        MoveRecord {
            move_index,
            row,
            col,
            color,
        }
    }

    #[test]
    fn stale_moves_are_ignored() {
        let mut predictor = VisualPredictor::new(GameState::with_default_players(2).unwrap());
        assert!(predictor
            .on_remote_move(record(0, 0, 0, PlayerColor::Red))
            .unwrap());
        assert!(!predictor
            .on_remote_move(record(0, 0, 0, PlayerColor::Red))
            .unwrap());
        assert_eq!(predictor.state().move_count(), 1);
        assert!(matches!(
            predictor.on_remote_move(record(3, 1, 1, PlayerColor::Blue)),
            Err(GameError::MoveOutOfOrder { expected: 1, got: 3 })
        ));
    }

    #[test]
    fn authoritative_state_waits_for_animation() {
        let start = GameState::with_default_players(2).unwrap();
        let mut predictor = VisualPredictor::new(start.clone());
        let moves = [
            record(0, 0, 0, PlayerColor::Red),
            record(1, 8, 5, PlayerColor::Blue),
            record(2, 0, 0, PlayerColor::Red),
        ];
        for m in moves {
            predictor.on_remote_move(m).unwrap();
        }
        assert!(predictor.is_animating());

        let mut authority = start;
        for m in moves {
            authority = authority.play_as(m.color, m.position()).unwrap().state;
        }
        predictor.on_authoritative_state(authority.clone());
        assert!(predictor.has_queued_state());

        predictor.tick(WAVE_DELAY_MS);
        assert!(!predictor.is_animating());
        assert!(!predictor.has_queued_state());
        assert_eq!(predictor.board(), authority.board());
        assert_eq!(predictor.state().state_hash(), authority.state_hash());
    }

    #[test]
    fn older_state_does_not_replace_queued_one() {
        let start = GameState::with_default_players(2).unwrap();
        let mut predictor = VisualPredictor::new(start.clone());
        let moves = [
            record(0, 0, 0, PlayerColor::Red),
            record(1, 8, 5, PlayerColor::Blue),
            record(2, 0, 0, PlayerColor::Red),
        ];
        for m in moves {
            predictor.on_remote_move(m).unwrap();
        }
        assert!(predictor.is_animating());

        let mut at_three = start;
        for m in moves {
            at_three = at_three.play_as(m.color, m.position()).unwrap().state;
        }
        let at_four = at_three
            .play_as(PlayerColor::Blue, Position::new(8, 4))
            .unwrap()
            .state;

        predictor.on_authoritative_state(at_four.clone());
        predictor.on_authoritative_state(at_three);
        predictor.tick(WAVE_DELAY_MS);

        assert_eq!(predictor.state().move_count(), 4);
        assert_eq!(predictor.state().state_hash(), at_four.state_hash());
    }
}
