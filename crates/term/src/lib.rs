//! Terminal rendering for interactive play.
//!
//! Renders into a plain framebuffer that is diffed and flushed to the
//! terminal, instead of going through a widget toolkit.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use chain_reaction_core as core;
pub use chain_reaction_engine as engine;
pub use chain_reaction_types as types;

pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use game_view::{color_rgb, Frame, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
