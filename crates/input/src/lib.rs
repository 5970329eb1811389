//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::UiAction`] and tracks the
//! board cursor. Nothing here touches game rules.

pub mod cursor;
pub mod map;

pub use chain_reaction_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, should_quit};
