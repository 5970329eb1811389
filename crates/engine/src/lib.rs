//! Session-level game engine
//!
//! Everything here is built on `chain_reaction_core` and adds the parts that
//! depend on time or on a move log:
//!
//! - [`session`]: the per-game state machine used by local play and the
//!   authoritative host
//! - [`playback`]: paced replay of a cascade's waves
//! - [`replay`]: rebuilding a state from a move log
//! - [`predictor`]: client-side prediction of remote moves

pub mod playback;
pub mod predictor;
pub mod replay;
pub mod session;

pub use chain_reaction_core as core;
pub use chain_reaction_types as types;

pub use playback::WavePlayback;
pub use predictor::VisualPredictor;
pub use replay::{replay, replay_from};
pub use session::{Accepted, Phase, Session};
