//! TCP server for the authoritative host
//!
//! Handles incoming connections, the hello handshake, seat assignment and
//! per-client sequencing. Game logic never runs here: moves are forwarded to
//! the game loop through a bounded channel.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::{EliminationRule, Player};
use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{board_size_for_player_count, BoardSize, PlayerColor, MAX_PLAYERS};

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Seats at the table; also picks the board size.
    pub players: usize,
    /// Nobody is eliminated before everyone has moved once.
    pub full_round: bool,
    pub max_pending_commands: usize,
    /// JSONL log of every line sent and received.
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            players: 2,
            full_round: false,
            max_pending_commands: 16,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `CHAIN_REACTION_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("CHAIN_REACTION_HOST").unwrap_or(defaults.host);
        let port = env::var("CHAIN_REACTION_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let players = env::var("CHAIN_REACTION_PLAYERS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.players);
        let full_round = env::var("CHAIN_REACTION_FULL_ROUND")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let max_pending_commands = env::var("CHAIN_REACTION_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let log_path = env::var("CHAIN_REACTION_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            players,
            full_round,
            max_pending_commands,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// Default roster: one player per seat, colors in seat order.
    pub fn roster(&self) -> Vec<Player> {
        PlayerColor::ALL
            .iter()
            .take(self.players.min(MAX_PLAYERS))
            .enumerate()
            .map(|(i, c)| Player::new(i as u32, *c))
            .collect()
    }

    pub fn elimination_rule(&self) -> EliminationRule {
        if self.full_round {
            EliminationRule::FullRound
        } else {
            EliminationRule::OpeningGuard
        }
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    size: BoardSize,
    roster: Vec<Player>,
    clients: RwLock<Vec<ClientHandle>>,
    /// Client id holding each seat, indexed like `roster`.
    seats: RwLock<Vec<Option<usize>>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let size = board_size_for_player_count(config.players)
            .with_context(|| format!("unsupported player count {}", config.players))?;
        let roster = config.roster();
        let seats = vec![None; roster.len()];
        Ok(Self {
            config,
            size,
            roster,
            clients: RwLock::new(Vec::new()),
            seats: RwLock::new(seats),
        })
    }
}

/// Seat `client_id`, preferring `requested` when it is free.
///
/// Returns `None` when the table is full; the client then observes.
pub fn assign_seat(
    seats: &mut [Option<usize>],
    roster: &[Player],
    requested: Option<PlayerColor>,
    client_id: usize,
) -> Option<PlayerColor> {
    if let Some(color) = requested {
        if let Some(i) = roster.iter().position(|p| p.color == color) {
            if seats[i].is_none() {
                seats[i] = Some(client_id);
                return Some(color);
            }
        }
    }
    let i = seats.iter().position(Option::is_none)?;
    seats[i] = Some(client_id);
    Some(roster[i].color)
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub color: Option<PlayerColor>,
    pub stream_state: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Welcome(WelcomeMessage),
    Error(ErrorMessage),
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(%path, error = %e, "wire log disabled");
                return;
            }
        };
        while let Some(bytes) = rx.recv().await {
            if file.write_all(&bytes).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "authority listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config)?);
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Line(line));
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.handshaken) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                    OutboundMessage::BroadcastState { line } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_state) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, state, command_tx, wire_log_tx).await
            {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            color: None,
            stream_state: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_tx_out = wire_log_tx.clone();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, welcome),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, err),
            };
            if encoded.is_err() {
                continue;
            }
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if let Some(tx) = wire_log_tx_out.as_ref() {
                let _ = tx.send(buf.clone());
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let raw_line = line.trim_end_matches(['\n', '\r']);
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(tx) = wire_log_tx.as_ref() {
            let _ = tx.send(raw_line.as_bytes().to_vec());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let handshaken = is_handshaken(&state, client_id).await;
                if handshaken && !check_and_update_seq(&state, client_id, hello.seq).await {
                    send_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                if !hello.protocol_version.starts_with("1.") {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let color = {
                    let mut clients = state.clients.write().await;
                    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
                        break;
                    };
                    if !client.handshaken {
                        let mut seats = state.seats.write().await;
                        client.color = assign_seat(
                            &mut seats,
                            &state.roster,
                            hello.requested.color.map(|w| w.0),
                            client_id,
                        );
                    }
                    client.handshaken = true;
                    client.last_seq = Some(hello.seq);
                    client.stream_state = hello.requested.stream_state;
                    client.color
                };

                match color {
                    Some(c) => info!(client_id, color = %c, client = %hello.client.name, "client seated"),
                    None => info!(client_id, client = %hello.client.name, "client observing"),
                }

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    color,
                    state.size,
                    &state.roster,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_state {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Move(mv)) => {
                if !is_handshaken(&state, client_id).await {
                    send_error(mv.seq, ErrorCode::HandshakeRequired, "Send hello before move");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, mv.seq).await {
                    send_error(
                        mv.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                let color = {
                    let clients = state.clients.read().await;
                    clients
                        .iter()
                        .find(|c| c.id == client_id)
                        .and_then(|c| c.color)
                };
                let Some(color) = color else {
                    send_error(mv.seq, ErrorCode::NotAPlayer, "Observers cannot move");
                    continue;
                };

                debug!(client_id, %color, row = mv.row, col = mv.col, "move received");
                let queued = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: mv.seq,
                    payload: InboundPayload::Move {
                        color,
                        row: mv.row,
                        col: mv.col,
                    },
                });
                if queued.is_err() {
                    send_error(mv.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, unknown.seq).await
                {
                    send_error(
                        unknown.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {e}"),
                );
            }
        }
    }

    // Clean up: remove client and free its seat.
    {
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
        let mut seats = state.seats.write().await;
        for seat in seats.iter_mut().filter(|s| **s == Some(client_id)) {
            *seat = None;
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_prefers_requested_color() {
        let roster = ServerConfig {
            players: 3,
            ..ServerConfig::default()
        }
        .roster();
        let mut seats = vec![None; 3];

        assert_eq!(
            assign_seat(&mut seats, &roster, Some(PlayerColor::Green), 1),
            Some(PlayerColor::Green)
        );
        // taken: falls back to the first free seat
        assert_eq!(
            assign_seat(&mut seats, &roster, Some(PlayerColor::Green), 2),
            Some(PlayerColor::Red)
        );
        // not in the roster
        assert_eq!(
            assign_seat(&mut seats, &roster, Some(PlayerColor::Cyan), 3),
            Some(PlayerColor::Blue)
        );
        assert_eq!(assign_seat(&mut seats, &roster, None, 4), None);
    }

    #[test]
    fn seq_extraction() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"x"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
    }

    #[test]
    fn config_helpers() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);
        assert_eq!(config.roster().len(), 2);
        assert_eq!(config.elimination_rule(), EliminationRule::OpeningGuard);

        let bad = ServerConfig {
            host: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
        assert!(ServerState::new(ServerConfig {
            players: 9,
            ..ServerConfig::default()
        })
        .is_err());
    }
}
