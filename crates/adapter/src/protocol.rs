//! Protocol module - JSON message types for the authoritative host
//!
//! Line-delimited JSON. All messages have: type, seq (sequence number), ts
//! (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{Board, Cell, EliminationRule, GameError, GameState, MoveRecord, Player};
use crate::engine::Accepted;
use crate::types::{BoardSize, PlayerColor};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "chain-reaction";

// ============== Shared Types ==============

/// Player color as a lowercase string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireColor(pub PlayerColor);

impl Serialize for WireColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for WireColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PlayerColor::from_str(&s)
            .map(WireColor)
            .ok_or_else(|| serde::de::Error::custom("invalid color"))
    }
}

impl From<PlayerColor> for WireColor {
    fn from(value: PlayerColor) -> Self {
        Self(value)
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u32,
    pub color: WireColor,
    pub name: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
}

fn default_alive() -> bool {
    true
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            color: WireColor(p.color),
            name: p.name.clone(),
            alive: p.is_alive,
        }
    }
}

impl From<&PlayerInfo> for Player {
    fn from(p: &PlayerInfo) -> Self {
        Player {
            id: p.id,
            color: p.color.0,
            name: p.name.clone(),
            is_alive: p.alive,
        }
    }
}

// ============== Client -> Host Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MoveType {
    #[default]
    #[serde(rename = "move")]
    Move,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedSeat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedSeat {
    /// Preferred color; any free seat is assigned when absent or taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<WireColor>,
    /// Receive a `state` message after every move.
    #[serde(default)]
    pub stream_state: bool,
}

/// Placement request from a seated player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: MoveType,
    pub seq: u64,
    pub ts: u64,
    pub row: usize,
    pub col: usize,
}

// ============== Host -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    #[serde(rename = "state")]
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_a_player")]
    NotAPlayer,
    #[serde(rename = "not_your_turn")]
    NotYourTurn,
    #[serde(rename = "invalid_move")]
    InvalidMove,
    #[serde(rename = "animation_in_progress")]
    AnimationInProgress,
    #[serde(rename = "game_finished")]
    GameFinished,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "internal")]
    Internal,
    #[serde(rename = "backpressure")]
    Backpressure,
}

impl From<&GameError> for ErrorCode {
    fn from(value: &GameError) -> Self {
        match value {
            GameError::InvalidMove(_) => ErrorCode::InvalidMove,
            GameError::AnimationInProgress => ErrorCode::AnimationInProgress,
            GameError::GameFinished => ErrorCode::GameFinished,
            GameError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            GameError::MoveOutOfOrder { .. } | GameError::InvalidRoster(_) => {
                ErrorCode::InvalidCommand
            }
            GameError::InvalidBoard(_) | GameError::WaveLimitExceeded { .. } => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "player")]
    Player,
    #[serde(rename = "observer")]
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<WireColor>,
    pub game_id: String,
    pub rows: usize,
    pub cols: usize,
    pub players: Vec<PlayerInfo>,
}

/// Acknowledgment for an applied move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// A resolved move, broadcast to every seated or observing client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveBroadcast {
    #[serde(rename = "type")]
    pub msg_type: MoveType,
    pub seq: u64,
    pub ts: u64,
    pub move_index: u32,
    pub row: usize,
    pub col: usize,
    pub color: WireColor,
    /// Detonation origins per wave, as `[row, col]` pairs.
    pub waves: Vec<Vec<[usize; 2]>>,
}

impl MoveBroadcast {
    pub fn record(&self) -> MoveRecord {
        MoveRecord {
            move_index: self.move_index,
            row: self.row,
            col: self.col,
            color: self.color.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub owner: Option<WireColor>,
}

/// Full authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: StateType,
    pub seq: u64,
    pub ts: u64,
    /// Number of moves applied so far.
    pub move_index: u32,
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `rows` rows of `cols` cells.
    pub cells: Vec<Vec<CellSnapshot>>,
    pub players: Vec<PlayerInfo>,
    pub current_player_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub winner: Option<WireColor>,
    pub finished: bool,
    pub state_hash: StateHash,
}

impl StateMessage {
    /// Rebuild the game state this message describes.
    pub fn to_game_state(&self, rule: EliminationRule) -> Result<GameState, GameError> {
        let cells = self
            .cells
            .iter()
            .flatten()
            .map(|c| Cell::new(c.count, c.owner.map(|w| w.0)))
            .collect();
        let board = Board::from_cells(BoardSize::new(self.rows, self.cols), cells)?;
        let players = self.players.iter().map(Player::from).collect();
        GameState::restore(
            board,
            players,
            self.current_player_index,
            self.move_index,
            rule,
        )
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "move")]
        Move(MoveRequest),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Move(m)) => Ok(ParsedMessage::Move(m)),
        Err(e) => {
            // An unknown type is reported to the client, not treated as garbage.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                #[serde(borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let head = serde_json::from_str::<TypeOnly>(json)?;
            match head.msg_type {
                Some("hello") | Some("move") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: head.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Move(MoveRequest),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(
    seq: u64,
    client_name: &str,
    protocol_version: &str,
    color: Option<PlayerColor>,
) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedSeat {
            color: color.map(WireColor),
            stream_state: true,
        },
    }
}

/// Create a move request
pub fn create_move(seq: u64, row: usize, col: usize) -> MoveRequest {
    MoveRequest {
        msg_type: MoveType::Move,
        seq,
        ts: current_timestamp_ms(),
        row,
        col,
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    color: Option<PlayerColor>,
    size: BoardSize,
    players: &[Player],
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role: if color.is_some() {
            AssignedRole::Player
        } else {
            AssignedRole::Observer
        },
        color: color.map(WireColor),
        game_id: GAME_ID.to_string(),
        rows: size.rows,
        cols: size.cols,
        players: players.iter().map(PlayerInfo::from).collect(),
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build the broadcast for an accepted move
pub fn build_move_broadcast(seq: u64, accepted: &Accepted) -> MoveBroadcast {
    MoveBroadcast {
        msg_type: MoveType::Move,
        seq,
        ts: current_timestamp_ms(),
        move_index: accepted.record.move_index,
        row: accepted.record.row,
        col: accepted.record.col,
        color: WireColor(accepted.record.color),
        waves: accepted
            .waves
            .iter()
            .map(|w| w.iter().map(|p| [p.row, p.col]).collect())
            .collect(),
    }
}

/// Build a state message from game state
pub fn build_state(seq: u64, state: &GameState) -> StateMessage {
    let board = state.board();
    let cells = board
        .cells()
        .chunks(board.cols().max(1))
        .map(|row| {
            row.iter()
                .map(|c| CellSnapshot {
                    count: c.count,
                    owner: c.owner.map(WireColor),
                })
                .collect()
        })
        .collect();

    StateMessage {
        msg_type: StateType::State,
        seq,
        ts: current_timestamp_ms(),
        move_index: state.move_count(),
        rows: board.rows(),
        cols: board.cols(),
        cells,
        players: state.players().iter().map(PlayerInfo::from).collect(),
        current_player_index: state.current_player_index(),
        winner: state.winner().map(|p| WireColor(p.color)),
        finished: state.is_finished(),
        state_hash: StateHash(state.state_hash()),
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"color":"Blue","stream_state":true}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "bot");
                assert_eq!(msg.requested.color, Some(WireColor(PlayerColor::Blue)));
                assert!(msg.requested.stream_state);
            }
            other => panic!("Expected Hello message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_move_and_unknown() {
        let json = r#"{"type":"move","seq":2,"ts":1,"row":3,"col":4}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Move(m) => {
                assert_eq!((m.row, m.col), (3, 4));
                assert_eq!(m.seq, 2);
            }
            other => panic!("Expected Move message, got {other:?}"),
        }

        let json = r#"{"type":"chat","seq":7,"ts":1}"#;
        assert!(matches!(
            parse_message(json).unwrap(),
            ParsedMessage::Unknown(UnknownMessage { seq: 7 })
        ));

        // known type, malformed body
        assert!(parse_message(r#"{"type":"move","seq":2,"ts":1,"row":-1,"col":0}"#).is_err());
    }

    #[test]
    fn test_state_hash_hex() {
        let json = serde_json::to_string(&StateHash(0xab)).unwrap();
        assert_eq!(json, "\"00000000000000ab\"");
        let back: StateHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StateHash(0xab));
    }

    #[test]
    fn test_state_message_rebuilds_game_state() {
        let state = GameState::with_default_players(3).unwrap();
        let state = state.play(Position::new(0, 0)).unwrap().state;
        let state = state.play(Position::new(5, 5)).unwrap().state;

        let msg = build_state(9, &state);
        assert_eq!(msg.cells.len(), 12);
        assert_eq!(msg.cells[0].len(), 10);
        assert_eq!(msg.move_index, 2);

        let line = serde_json::to_string(&msg).unwrap();
        let parsed: StateMessage = serde_json::from_str(&line).unwrap();
        let rebuilt = parsed.to_game_state(EliminationRule::OpeningGuard).unwrap();
        assert_eq!(rebuilt.state_hash(), state.state_hash());
        assert_eq!(rebuilt.board(), state.board());
    }

    #[test]
    fn test_error_code_from_game_error() {
        let e = GameError::NotYourTurn {
            expected: PlayerColor::Red,
            got: PlayerColor::Blue,
        };
        assert_eq!(ErrorCode::from(&e), ErrorCode::NotYourTurn);
        let json = serde_json::to_string(&create_error(3, ErrorCode::from(&e), "no")).unwrap();
        assert!(json.contains("\"code\":\"not_your_turn\""));
    }
}
