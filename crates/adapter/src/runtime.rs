//! Authority runtime
//!
//! The TCP server only parses, sequences and seats clients. Every accepted
//! command is funnelled through one bounded channel into a single game loop
//! that owns the [`Session`], so moves resolve strictly one at a time.

use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::GameState;
use crate::engine::Session;
use crate::protocol::{build_move_broadcast, build_state, create_ack, create_error, ErrorCode};
use crate::server::{run_server, ServerConfig};
use crate::types::{PlayerColor, Position};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Send the current state to this client only.
    SnapshotRequest,
    /// Placement from the client seated as `color`.
    Move {
        color: PlayerColor,
        row: usize,
        col: usize,
    },
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// Every handshaken client.
    Broadcast { line: String },
    /// Handshaken clients that asked for state streaming.
    BroadcastState { line: String },
}

/// The single owner of the authoritative session.
#[derive(Debug)]
pub struct AuthoritativeGame {
    session: Session,
    seq: u64,
}

impl AuthoritativeGame {
    /// Waves are never paced on the host.
    pub fn new(session: Session) -> Self {
        Self {
            session: session.with_wave_delay(0),
            seq: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Apply one command and return what should go out on the wire.
    pub fn handle(&mut self, cmd: InboundCommand) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        match cmd.payload {
            InboundPayload::SnapshotRequest => {
                let seq = self.next_seq();
                let state = build_state(seq, self.session.state());
                if let Some(line) = to_line(&state) {
                    out.push(OutboundMessage::ToClient {
                        client_id: cmd.client_id,
                        line,
                    });
                }
            }
            InboundPayload::Move { color, row, col } => {
                match self.session.submit_as(color, Position::new(row, col)) {
                    Ok(accepted) => {
                        if let Some(line) = to_line(&create_ack(cmd.seq)) {
                            out.push(OutboundMessage::ToClient {
                                client_id: cmd.client_id,
                                line,
                            });
                        }
                        let seq = self.next_seq();
                        if let Some(line) = to_line(&build_move_broadcast(seq, &accepted)) {
                            out.push(OutboundMessage::Broadcast { line });
                        }
                        let seq = self.next_seq();
                        if let Some(line) = to_line(&build_state(seq, self.session.state())) {
                            out.push(OutboundMessage::BroadcastState { line });
                        }
                    }
                    Err(e) => {
                        debug!(
                            client_id = cmd.client_id,
                            %color,
                            row,
                            col,
                            error = %e,
                            "move rejected"
                        );
                        let err = create_error(cmd.seq, ErrorCode::from(&e), &e.to_string());
                        if let Some(line) = to_line(&err) {
                            out.push(OutboundMessage::ToClient {
                                client_id: cmd.client_id,
                                line,
                            });
                        }
                    }
                }
            }
        }
        out
    }
}

fn to_line<T: Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to serialize outbound message");
            None
        }
    }
}

/// Run the server and the game loop until the server stops.
pub async fn run_authority(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let state = GameState::new(config.roster())?.with_rule(config.elimination_rule());
    let session = Session::new(state);
    let max_pending = config.max_pending_commands.max(1);
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    info!(players = config.players, "starting authoritative game");
    let server = tokio::spawn(run_server(config, cmd_tx, out_rx, ready_tx));

    let mut game = AuthoritativeGame::new(session);
    while let Some(cmd) = cmd_rx.recv().await {
        for msg in game.handle(cmd) {
            if out_tx.send(msg).is_err() {
                break;
            }
        }
    }

    server.await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> AuthoritativeGame {
        AuthoritativeGame::new(Session::with_players(2).unwrap())
    }

    #[test]
    fn legal_move_acks_and_broadcasts() {
        let mut game = game();
        let out = game.handle(InboundCommand {
            client_id: 1,
            seq: 5,
            payload: InboundPayload::Move {
                color: PlayerColor::Red,
                row: 0,
                col: 0,
            },
        });
        assert_eq!(out.len(), 3);
        match &out[0] {
            OutboundMessage::ToClient { client_id, line } => {
                assert_eq!(*client_id, 1);
                let v: serde_json::Value = serde_json::from_str(line).unwrap();
                assert_eq!(v["type"], "ack");
                assert_eq!(v["seq"], 5);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(out[1], OutboundMessage::Broadcast { .. }));
        assert!(matches!(out[2], OutboundMessage::BroadcastState { .. }));
        assert_eq!(game.session().state().move_count(), 1);
    }

    #[test]
    fn out_of_turn_move_is_rejected() {
        let mut game = game();
        let out = game.handle(InboundCommand {
            client_id: 2,
            seq: 1,
            payload: InboundPayload::Move {
                color: PlayerColor::Blue,
                row: 0,
                col: 0,
            },
        });
        assert_eq!(out.len(), 1);
        let OutboundMessage::ToClient { line, .. } = &out[0] else {
            panic!("expected a direct reply");
        };
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "not_your_turn");
        assert_eq!(game.session().state().move_count(), 0);
    }
}
