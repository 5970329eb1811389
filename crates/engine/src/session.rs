//! Per-game session state machine
//!
//! `InProgress -> Resolving -> InProgress | Finished`. The cascade itself is
//! resolved synchronously when a move is accepted; `Resolving` only lasts
//! while its waves are being played back. A session with a zero wave delay
//! never reports `Resolving`.

use tracing::{debug, info};

use crate::core::cascade::place;
use crate::core::{Board, DetonationWave, GameError, GameState, MoveRecord};
use crate::playback::WavePlayback;
use crate::types::{PlayerColor, Position, WAVE_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Resolving,
    Finished,
}

/// What an accepted move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub record: MoveRecord,
    pub waves: Vec<DetonationWave>,
    pub eliminated: Vec<PlayerColor>,
    pub winner: Option<PlayerColor>,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    initial: GameState,
    playback: Option<WavePlayback>,
    history: Vec<MoveRecord>,
    wave_delay_ms: u32,
}

impl Session {
    pub fn new(state: GameState) -> Self {
        Self {
            initial: state.clone(),
            state,
            playback: None,
            history: Vec::new(),
            wave_delay_ms: WAVE_DELAY_MS,
        }
    }

    /// Session for `count` default players.
    pub fn with_players(count: usize) -> Result<Self, GameError> {
        Ok(Self::new(GameState::with_default_players(count)?))
    }

    /// Delay between waves during playback; 0 resolves moves instantly.
    pub fn with_wave_delay(mut self, wave_delay_ms: u32) -> Self {
        self.wave_delay_ms = wave_delay_ms;
        self
    }

    pub fn phase(&self) -> Phase {
        if self.playback.is_some() {
            Phase::Resolving
        } else if self.state.is_finished() {
            Phase::Finished
        } else {
            Phase::InProgress
        }
    }

    /// The resolved state. While resolving, `is_animating` is set.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Board to draw: the playback frame while resolving, else the state's.
    pub fn display_board(&self) -> &Board {
        match &self.playback {
            Some(p) => p.board(),
            None => self.state.board(),
        }
    }

    pub fn playback(&self) -> Option<&WavePlayback> {
        self.playback.as_ref()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Move for the current player.
    pub fn submit(&mut self, pos: Position) -> Result<Accepted, GameError> {
        let color = self.state.current_player().color;
        self.submit_as(color, pos)
    }

    /// Move for `color`; rejected unless it is their turn.
    pub fn submit_as(&mut self, color: PlayerColor, pos: Position) -> Result<Accepted, GameError> {
        let transition = self.state.play_as(color, pos)?;
        let placed = place(self.state.board(), pos, color)?;

        info!(
            move_index = transition.record.move_index,
            %color,
            row = pos.row,
            col = pos.col,
            waves = transition.waves.len(),
            "move accepted"
        );
        for out in &transition.eliminated {
            info!(color = %out, "player eliminated");
        }

        let winner = transition.state.winner().map(|p| p.color);
        if let Some(w) = winner {
            info!(winner = %w, moves = transition.state.move_count(), "game finished");
        }

        if self.wave_delay_ms > 0 && !transition.waves.is_empty() {
            self.playback = Some(WavePlayback::new(
                placed,
                color,
                transition.waves.len(),
                self.wave_delay_ms,
            ));
            self.state = transition.state.with_animating(true);
        } else {
            self.state = transition.state;
        }
        self.history.push(transition.record);

        Ok(Accepted {
            record: transition.record,
            waves: transition.waves,
            eliminated: transition.eliminated,
            winner,
        })
    }

    /// Advance playback by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) {
        let done = match self.playback.as_mut() {
            Some(p) => p.tick(elapsed_ms),
            None => return,
        };
        if done {
            self.finish_playback();
        }
    }

    /// End playback now and accept moves again.
    pub fn finish_playback(&mut self) {
        if self.playback.take().is_some() {
            debug!(move_count = self.state.move_count(), "playback finished");
            self.state = self.state.clone().with_animating(false);
        }
    }

    /// Fresh game with the same roster and settings.
    pub fn restart(&mut self) {
        info!(moves = self.history.len(), "session restarted");
        self.state = self.initial.clone();
        self.playback = None;
        self.history.clear();
    }
}
