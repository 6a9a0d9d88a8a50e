//! Protocol module - JSON message types for the network adapter
//!
//! Line-delimited JSON. Every message has: type, seq (sequence number),
//! ts (timestamp in ms).

use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, MoveResult};
use crate::store::{Fnv1aHasher, LeaderboardEntry, Player};
use crate::types::{Direction, GameAction, Grid, TileMove, BOARD_SIZE};

use arrayvec::ArrayVec;

/// Most actions accepted in one command
pub const MAX_ACTIONS: usize = 32;

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    #[serde(rename = "query")]
    Query,
}

impl Default for QueryType {
    fn default() -> Self {
        Self::Query
    }
}

/// Client hello message (first message of every connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    /// Secret identifying the player across connections; only its fingerprint is stored.
    /// Falls back to `client.name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

impl HelloMessage {
    pub fn credential(&self) -> &str {
        self.credential.as_deref().unwrap_or(&self.client.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(rename = "stream_observations")]
    pub stream_observations: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

/// Command message: actions applied in order
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub actions: ActionList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Up,
    Down,
    Left,
    Right,
    Restart,
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        self.to_action().as_str()
    }

    pub fn to_action(self) -> GameAction {
        match self {
            ActionName::Up => GameAction::MoveUp,
            ActionName::Down => GameAction::MoveDown,
            ActionName::Left => GameAction::MoveLeft,
            ActionName::Right => GameAction::MoveRight,
            ActionName::Restart => GameAction::Restart,
        }
    }
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        // The leaderboard toggle is a front-end action with no meaning on the wire.
        match GameAction::from_str(s) {
            Some(GameAction::MoveUp) => Ok(Self::Up),
            Some(GameAction::MoveDown) => Ok(Self::Down),
            Some(GameAction::MoveLeft) => Ok(Self::Left),
            Some(GameAction::MoveRight) => Ok(Self::Right),
            Some(GameAction::Restart) => Ok(Self::Restart),
            Some(GameAction::Leaderboard) | None => Err(serde::de::Error::custom("unknown action")),
        }
    }
}

impl Serialize for ActionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList(pub ArrayVec<ActionName, MAX_ACTIONS>);

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of action strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<ActionName, MAX_ACTIONS>::new();
                while let Some(a) = seq.next_element::<ActionName>()? {
                    out.try_push(a)
                        .map_err(|_| serde::de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Query message: read-only requests
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: QueryType,
    pub seq: u64,
    pub ts: u64,
    pub what: QueryWhat,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryWhat {
    Leaderboard,
}

impl<'de> Deserialize<'de> for QueryWhat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("leaderboard") {
            Ok(Self::Leaderboard)
        } else {
            Err(serde::de::Error::custom("unknown query"))
        }
    }
}

// ============== Server -> Client Messages ==============

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
pub enum LeaderboardType {
    #[serde(rename = "leaderboard")]
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_username")]
    InvalidUsername,
    #[serde(rename = "storage")]
    Storage,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub game_id: String,
    pub player: PlayerInfo,
    pub best_score: u32,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub username: String,
}

impl From<&Player> for PlayerInfo {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id,
            username: value.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub actions: [String; 5],
    pub features: Vec<CapabilityFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFeature {
    #[serde(rename = "last_move")]
    LastMove,
    #[serde(rename = "state_hash")]
    StateHash,
    #[serde(rename = "leaderboard")]
    Leaderboard,
}

/// Acknowledgment for command receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Actions that changed the board
    pub applied: u32,
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

/// Leaderboard rows plus the asking player's rank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardMessage {
    #[serde(rename = "type")]
    pub msg_type: LeaderboardType,
    pub seq: u64,
    pub ts: u64,
    pub entries: Vec<LeaderboardEntry>,
    pub player_rank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Game state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    #[serde(rename = "game_over")]
    pub game_over: bool,
    pub won: bool,
    #[serde(rename = "episode_id")]
    pub episode_id: u32,
    pub seed: u32,
    pub turn: u32,
    pub board: BoardSnapshot,
    pub score: u32,
    #[serde(rename = "best_score")]
    pub best_score: u32,
    #[serde(rename = "max_tile")]
    pub max_tile: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "last_move")]
    #[serde(default)]
    pub last_move: Option<LastMove>,
    #[serde(rename = "state_hash")]
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: u8,
    pub cells: Grid,
}

/// Outcome of the last action that was a move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub direction: DirectionLower,
    pub moved: bool,
    pub score: u32,
    pub moves: Vec<TileMoveSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub spawned: Option<SpawnedTile>,
}

impl From<&MoveResult> for LastMove {
    fn from(value: &MoveResult) -> Self {
        let spawned = value.new_tile.map(|p| SpawnedTile {
            row: p.row,
            col: p.col,
            value: value.board_after[p.row as usize][p.col as usize],
        });
        Self {
            direction: value.direction.into(),
            moved: value.moved,
            score: value.score,
            moves: value.moves.iter().map(TileMoveSnapshot::from).collect(),
            spawned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileMoveSnapshot {
    pub from: [u8; 2],
    pub to: [u8; 2],
    pub value: u32,
    pub merged: bool,
}

impl From<&TileMove> for TileMoveSnapshot {
    fn from(value: &TileMove) -> Self {
        Self {
            from: [value.from.row, value.from.col],
            to: [value.to.row, value.to.col],
            value: value.value,
            merged: value.merged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnedTile {
    pub row: u8,
    pub col: u8,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionLower {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
}

impl From<Direction> for DirectionLower {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => Self::Up,
            Direction::Down => Self::Down,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
        }
    }
}

/// Deterministic state hash serialized as lowercase hex (without heap allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl StateHash {
    /// FNV-1a over everything an observation reports about the game.
    pub fn of(snap: &GameSnapshot) -> Self {
        let mut h = Fnv1aHasher::new();
        for row in &snap.board {
            for &v in row {
                h.write_u32(v);
            }
        }
        h.write_u32(snap.score);
        h.write_u32(snap.episode_id);
        h.write_u32(snap.turns);
        h.write_u8(snap.won as u8);
        h.write_u8(snap.game_over as u8);
        Self(h.finish())
    }
}

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            let nib = (v & 0x0f) as usize;
            buf[15 - i] = HEX[nib];
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
        let s = <&str>::deserialize(deserializer)?;
        let s = s.trim();
        if s.is_empty() || s.len() > 16 {
            return Err(serde::de::Error::custom("invalid hex"));
        }
        let mut v: u64 = 0;
        for b in s.as_bytes() {
            let d = match b {
                b'0'..=b'9' => (b - b'0') as u64,
                b'a'..=b'f' => (b - b'a' + 10) as u64,
                b'A'..=b'F' => (b - b'A' + 10) as u64,
                _ => return Err(serde::de::Error::custom("invalid hex")),
            };
            v = (v << 4) | d;
        }
        Ok(StateHash(v))
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
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "query")]
        Query(QueryMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Query(m)) => Ok(ParsedMessage::Query(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                #[serde(borrow)]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if !matches!(msg_type, "hello" | "command" | "query") {
                #[derive(Debug, Deserialize)]
                struct SeqOnly {
                    seq: Option<u64>,
                }
                let seq = serde_json::from_str::<SeqOnly>(json)?.seq.unwrap_or(0);
                return Ok(ParsedMessage::Unknown(UnknownMessage { seq }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Query(QueryMessage),
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
    credential: &str,
    protocol_version: &str,
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
        credential: Some(credential.to_string()),
        requested: RequestedCapabilities::default(),
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    player: &Player,
    best_score: u32,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        game_id: "tui-2048".to_string(),
        player: PlayerInfo::from(player),
        best_score,
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            actions: [
                ActionName::Up,
                ActionName::Down,
                ActionName::Left,
                ActionName::Right,
                ActionName::Restart,
            ]
            .map(|a| a.as_str().to_string()),
            features: vec![
                CapabilityFeature::LastMove,
                CapabilityFeature::StateHash,
                CapabilityFeature::Leaderboard,
            ],
        },
    }
}

/// Create an observation of `snap`, with the outcome of the last move if any
pub fn create_observation(
    seq: u64,
    snap: &GameSnapshot,
    last: Option<&MoveResult>,
) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        game_over: snap.game_over,
        won: snap.won,
        episode_id: snap.episode_id,
        seed: snap.seed,
        turn: snap.turns,
        board: BoardSnapshot {
            size: BOARD_SIZE as u8,
            cells: snap.board,
        },
        score: snap.score,
        best_score: snap.best_score,
        max_tile: snap.max_tile,
        last_move: last.map(LastMove::from),
        state_hash: StateHash::of(snap),
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64, applied: u32) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        applied,
    }
}

/// Create a leaderboard reply
pub fn create_leaderboard(
    seq: u64,
    entries: Vec<LeaderboardEntry>,
    player_rank: usize,
) -> LeaderboardMessage {
    LeaderboardMessage {
        msg_type: LeaderboardType::Leaderboard,
        seq,
        ts: current_timestamp_ms(),
        entries,
        player_rank,
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

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
