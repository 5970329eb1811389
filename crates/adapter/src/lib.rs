//! Authoritative host for networked games
//!
//! One process owns the game. Clients connect over TCP and speak a
//! line-delimited JSON protocol; the host validates and resolves every move
//! and broadcasts the result, so all peers converge on the same board.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Seating**: Clients take free seats in roster order, or a requested
//!    color when it is still free. Late joiners observe.
//! 4. **Moves**: A seated client sends `move`; the host replies `ack` or
//!    `error` and broadcasts the accepted `move` with its detonation waves.
//! 5. **State streaming**: Clients that ask for it also receive a full
//!    `state` snapshot after every accepted move.
//!
//! # Environment Variables
//!
//! - `CHAIN_REACTION_HOST`: Bind address (default: "127.0.0.1")
//! - `CHAIN_REACTION_PORT`: Port number (default: 7878)
//! - `CHAIN_REACTION_PLAYERS`: Seats at the table (default: 2)
//! - `CHAIN_REACTION_FULL_ROUND`: "1" or "true" delays elimination until
//!   everyone has moved once
//! - `CHAIN_REACTION_MAX_PENDING`: Game loop queue size (default: 16)
//! - `CHAIN_REACTION_WIRE_LOG`: Append every wire line to this JSONL file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"color":"red","stream_state":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0","client_id":1,"role":"player","color":"red",...}
//! Client -> Server: {"type":"move","seq":2,"ts":3,"row":0,"col":0}
//! Server -> Client: {"type":"ack","seq":2,"ts":4,"status":"ok"}
//! Server -> Client: {"type":"move","seq":1,"ts":4,"move_index":0,"row":0,"col":0,"color":"red","waves":[]}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use chain_reaction_core as core;
pub use chain_reaction_engine as engine;
pub use chain_reaction_types as types;

pub use protocol::*;
pub use runtime::{run_authority, AuthoritativeGame, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{assign_seat, run_server, ClientHandle, ClientOutbound, ServerConfig, ServerState};
