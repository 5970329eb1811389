//! Chain reaction (workspace facade crate).
//!
//! Re-exports the workspace crates as
//! `chain_reaction::{core,adapter,term,input,engine,types}` so binaries,
//! integration tests and benchmarks depend on one package.

pub use chain_reaction_adapter as adapter;
pub use chain_reaction_core as core;
pub use chain_reaction_engine as engine;
pub use chain_reaction_input as input;
pub use chain_reaction_term as term;
pub use chain_reaction_types as types;
