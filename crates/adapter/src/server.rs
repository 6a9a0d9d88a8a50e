//! TCP server for the network adapter
//!
//! Every connection plays its own game. The connection task owns a
//! [`Session`]; only the score store is shared between connections.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::core::{GameState, Latch, MoveResult};
use crate::protocol::*;
use crate::store::{fingerprint, validate_username, Player, ScoreStore};
use crate::types::{GameAction, LEADERBOARD_LIMIT};

/// Largest leaderboard a client may ask for
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

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
    /// Seed for every new session; random per session when unset
    pub seed: Option<u32>,
    /// JSONL wire log of every line sent and received
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23234,
            protocol_version: "1.0.0".to_string(),
            seed: None,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `TWENTY48_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TWENTY48_HOST").unwrap_or(defaults.host);
        let port = env::var("TWENTY48_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let seed = env::var("TWENTY48_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());
        let log_path = env::var("TWENTY48_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            seed,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    fn accepts_protocol(&self, requested: &str) -> bool {
        let major = |v: &str| v.split('.').next().map(str::to_string);
        major(requested).is_some() && major(requested) == major(&self.protocol_version)
    }
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Observation(Box<ObservationMessage>),
    Ack(AckMessage),
    Leaderboard(LeaderboardMessage),
    Error(ErrorMessage),
}

impl ClientOutbound {
    fn encode_into(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        match self {
            ClientOutbound::Welcome(v) => serde_json::to_writer(buf, v),
            ClientOutbound::Observation(v) => serde_json::to_writer(buf, v),
            ClientOutbound::Ack(v) => serde_json::to_writer(buf, v),
            ClientOutbound::Leaderboard(v) => serde_json::to_writer(buf, v),
            ClientOutbound::Error(v) => serde_json::to_writer(buf, v),
        }
    }
}

/// Whether the connection stays open after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Protocol state of one connection
pub struct Session {
    client_id: usize,
    config: Arc<ServerConfig>,
    last_seq: Option<u64>,
    stream_observations: bool,
    player: Option<Player>,
    game: Option<GameState>,
    /// Set once the current episode's score is in the store
    saved: Latch,
    obs_seq: u64,
}

impl Session {
    pub fn new(client_id: usize, config: Arc<ServerConfig>) -> Self {
        Self {
            client_id,
            config,
            last_seq: None,
            stream_observations: true,
            player: None,
            game: None,
            saved: Latch::new(),
            obs_seq: 0,
        }
    }

    pub fn is_handshaken(&self) -> bool {
        self.player.is_some()
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    fn check_and_update_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }

    /// Handle one inbound line, pushing the replies onto `out`.
    pub fn handle_line(
        &mut self,
        line: &str,
        store: &mut ScoreStore,
        out: &mut Vec<ClientOutbound>,
    ) -> Flow {
        let msg = match parse_message(line) {
            Ok(msg) => msg,
            Err(e) => {
                let seq = extract_seq_best_effort(line).unwrap_or(0);
                tracing::warn!(client_id = self.client_id, error = %e, "unparseable message");
                out.push(error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                ));
                return Flow::Continue;
            }
        };

        let seq = match &msg {
            ParsedMessage::Hello(m) => m.seq,
            ParsedMessage::Command(m) => m.seq,
            ParsedMessage::Query(m) => m.seq,
            ParsedMessage::Unknown(m) => m.seq,
        };

        let is_hello = matches!(msg, ParsedMessage::Hello(_));
        if !self.is_handshaken() && !is_hello {
            out.push(error(seq, ErrorCode::HandshakeRequired, "Send hello first"));
            return Flow::Continue;
        }

        // Sequencing: enforce monotonic seq per connection once handshaken.
        if self.is_handshaken() && !self.check_and_update_seq(seq) {
            out.push(error(
                seq,
                ErrorCode::InvalidCommand,
                "seq must be strictly increasing",
            ));
            return Flow::Continue;
        }

        match msg {
            ParsedMessage::Hello(hello) => self.on_hello(hello, store, out),
            ParsedMessage::Command(cmd) => {
                self.on_command(cmd, store, out);
                Flow::Continue
            }
            ParsedMessage::Query(query) => {
                self.on_query(query, store, out);
                Flow::Continue
            }
            ParsedMessage::Unknown(m) => {
                out.push(error(m.seq, ErrorCode::InvalidCommand, "Unknown message type"));
                Flow::Continue
            }
        }
    }

    fn on_hello(
        &mut self,
        hello: HelloMessage,
        store: &mut ScoreStore,
        out: &mut Vec<ClientOutbound>,
    ) -> Flow {
        if !self.config.accepts_protocol(&hello.protocol_version) {
            out.push(error(
                hello.seq,
                ErrorCode::ProtocolMismatch,
                &format!("Protocol version {} not supported", hello.protocol_version),
            ));
            return Flow::Close;
        }

        let (player, best) = match self.find_or_register(&hello, store) {
            Ok(found) => found,
            Err(reply) => {
                out.push(reply);
                return Flow::Continue;
            }
        };

        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.game = Some(GameState::seeded(seed, best));
        self.saved = Latch::new();
        self.last_seq = Some(hello.seq);
        self.stream_observations = hello.requested.stream_observations;

        tracing::info!(
            client_id = self.client_id,
            player_id = player.id,
            username = %player.username,
            best,
            "handshake complete"
        );

        out.push(ClientOutbound::Welcome(create_welcome(
            hello.seq,
            &self.config.protocol_version,
            &player,
            best,
        )));
        self.player = Some(player);

        if self.stream_observations {
            self.push_observation(None, out);
        }
        Flow::Continue
    }

    /// Player for the hello's credential plus their best score, registering
    /// unknown fingerprints under `client.name`.
    fn find_or_register(
        &self,
        hello: &HelloMessage,
        store: &mut ScoreStore,
    ) -> Result<(Player, u32), ClientOutbound> {
        let storage = |e: anyhow::Error| {
            tracing::warn!(client_id = self.client_id, error = %e, "score store failed");
            error(hello.seq, ErrorCode::Storage, &format!("{:#}", e))
        };

        let fp = fingerprint(hello.credential());
        let player = match store.player_by_fingerprint(&fp).map_err(storage)? {
            Some(p) => p,
            None => {
                if let Err(e) = validate_username(&hello.client.name) {
                    return Err(error(
                        hello.seq,
                        ErrorCode::InvalidUsername,
                        &e.to_string(),
                    ));
                }
                store
                    .create_player(&fp, &hello.client.name)
                    .map_err(storage)?
            }
        };
        let best = store.best_score(player.id).map_err(storage)?;
        Ok((player, best))
    }

    fn on_command(
        &mut self,
        cmd: CommandMessage,
        store: &mut ScoreStore,
        out: &mut Vec<ClientOutbound>,
    ) {
        let (Some(game), Some(player)) = (self.game.as_mut(), self.player.as_ref()) else {
            return;
        };

        let mut applied = 0u32;
        let mut last: Option<MoveResult> = None;
        let mut storage_error: Option<anyhow::Error> = None;

        for action in cmd.actions.0.iter().map(|a| a.to_action()) {
            if action == GameAction::Restart {
                game.reset();
                self.saved = Latch::new();
                last = None;
                applied += 1;
                continue;
            }

            let Some(result) = game.apply_action(action) else {
                continue;
            };
            if result.moved {
                applied += 1;
            }
            last = Some(result);

            if game.game_over() && self.saved.set() {
                if let Err(e) = store.save_score(player.id, game.score(), game.max_tile()) {
                    tracing::warn!(client_id = self.client_id, error = %e, "saving score failed");
                    storage_error = Some(e);
                }
            }
        }

        tracing::debug!(client_id = self.client_id, seq = cmd.seq, applied, "command applied");

        out.push(ClientOutbound::Ack(create_ack(cmd.seq, applied)));
        if let Some(e) = storage_error {
            out.push(error(cmd.seq, ErrorCode::Storage, &format!("{:#}", e)));
        }
        self.push_observation(last.as_ref(), out);
    }

    fn on_query(&mut self, query: QueryMessage, store: &ScoreStore, out: &mut Vec<ClientOutbound>) {
        match query.what {
            QueryWhat::Leaderboard => {
                let limit = query
                    .limit
                    .unwrap_or(LEADERBOARD_LIMIT)
                    .clamp(1, MAX_LEADERBOARD_LIMIT);
                let loaded = store.leaderboard(limit).and_then(|entries| {
                    let rank = match self.player.as_ref() {
                        Some(p) => store.player_rank(p.id)?,
                        None => 0,
                    };
                    Ok((entries, rank))
                });
                match loaded {
                    Ok((entries, rank)) => out.push(ClientOutbound::Leaderboard(
                        create_leaderboard(query.seq, entries, rank),
                    )),
                    Err(e) => {
                        tracing::warn!(
                            client_id = self.client_id,
                            error = %e,
                            "leaderboard query failed"
                        );
                        out.push(error(query.seq, ErrorCode::Storage, &format!("{:#}", e)));
                    }
                }
            }
        }
    }

    fn push_observation(&mut self, last: Option<&MoveResult>, out: &mut Vec<ClientOutbound>) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        self.obs_seq += 1;
        let obs = create_observation(self.obs_seq, &game.snapshot(), last);
        out.push(ClientOutbound::Observation(Box::new(obs)));
    }
}

fn error(seq: u64, code: ErrorCode, message: &str) -> ClientOutbound {
    ClientOutbound::Error(create_error(seq, code, message))
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Vec<u8>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "wire log disabled");
                return;
            }
        };

        while let Some(line) = rx.recv().await {
            if file.write_all(&line).await.is_err() || file.write_all(b"\n").await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Start the TCP server
///
/// Runs until the listener fails. The bound address is reported through
/// `ready_tx`, which lets callers bind port 0.
pub async fn run_server(
    config: ServerConfig,
    store: Arc<Mutex<ScoreStore>>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    let bound = listener.local_addr()?;
    tracing::info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let config = Arc::new(config);
    let mut client_id_counter = 0usize;

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        tracing::info!(client_id, peer = %addr, "client connected");

        let config = Arc::clone(&config);
        let store = Arc::clone(&store);
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, config, store, wire_log_tx).await {
                tracing::warn!(client_id, error = %e, "client error");
            }
            tracing::info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    config: Arc<ServerConfig>,
    store: Arc<Mutex<ScoreStore>>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    let wire_log_tx_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if msg.encode_into(&mut buf).is_err() {
                continue;
            }
            if let Some(tx) = wire_log_tx_out.as_ref() {
                let _ = tx.send(buf.clone());
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(client_id, config);
    let mut replies: Vec<ClientOutbound> = Vec::with_capacity(4);
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

        let flow = {
            let mut store = store.lock().await;
            session.handle_line(trimmed, &mut store, &mut replies)
        };
        for reply in replies.drain(..) {
            let _ = tx.send(reply);
        }
        if flow == Flow::Close {
            break;
        }
    }

    // Let the writer drain what is queued before the socket closes.
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            seed: Some(12345),
            ..ServerConfig::default()
        })
    }

    fn hello(seq: u64, name: &str) -> String {
        format!(
            r#"{{"type":"hello","seq":{},"ts":0,"client":{{"name":"{}","version":"1"}},"protocol_version":"1.0.0"}}"#,
            seq, name
        )
    }

    fn command(seq: u64, actions: &str) -> String {
        format!(r#"{{"type":"command","seq":{},"ts":0,"actions":[{}]}}"#, seq, actions)
    }

    fn error_code(msg: &ClientOutbound) -> Option<ErrorCode> {
        match msg {
            ClientOutbound::Error(e) => Some(e.code),
            _ => None,
        }
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "oops"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"seq":"x"}"#), None);
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 23234);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:23234".parse::<SocketAddr>().unwrap()
        );
        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_protocol_major_must_match() {
        let config = ServerConfig::default();
        assert!(config.accepts_protocol("1.0.0"));
        assert!(config.accepts_protocol("1.7"));
        assert!(!config.accepts_protocol("2.0.0"));
        assert!(!config.accepts_protocol(""));
    }

    #[test]
    fn test_command_before_hello() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        let flow = session.handle_line(&command(1, "\"left\""), &mut store, &mut out);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out.len(), 1);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::HandshakeRequired));
    }

    #[test]
    fn test_hello_registers_player_and_streams() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "alice"), &mut store, &mut out);

        assert!(session.is_handshaken());
        assert_eq!(store.player_count().unwrap(), 1);
        assert!(matches!(&out[0], ClientOutbound::Welcome(w) if w.player.username == "alice"));
        match &out[1] {
            ClientOutbound::Observation(obs) => {
                let tiles = obs.board.cells.iter().flatten().filter(|&&v| v != 0).count();
                assert_eq!(tiles, 2);
                assert_eq!(obs.seed, 12345);
                assert!(obs.last_move.is_none());
            }
            other => panic!("expected observation, got {:?}", other),
        }
    }

    #[test]
    fn test_returning_player_keeps_identity_and_best() {
        let mut store = ScoreStore::in_memory().unwrap();
        let player = store.create_player(&fingerprint("alice"), "alice").unwrap();
        store.save_score(player.id, 900, 64).unwrap();

        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "alice"), &mut store, &mut out);
        assert_eq!(store.player_count().unwrap(), 1);
        match &out[0] {
            ClientOutbound::Welcome(w) => {
                assert_eq!(w.player.id, player.id);
                assert_eq!(w.best_score, 900);
            }
            other => panic!("expected welcome, got {:?}", other),
        }
        assert_eq!(session.game().unwrap().best_score(), 900);
    }

    #[test]
    fn test_invalid_username() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "ab"), &mut store, &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::InvalidUsername));
        assert!(!session.is_handshaken());
        assert_eq!(store.player_count().unwrap(), 0);
    }

    #[test]
    fn test_protocol_mismatch_closes() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        let line = hello(1, "alice").replace("1.0.0", "2.0.0");
        assert_eq!(session.handle_line(&line, &mut store, &mut out), Flow::Close);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::ProtocolMismatch));
    }

    #[test]
    fn test_seq_must_increase() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(5, "alice"), &mut store, &mut out);
        out.clear();

        session.handle_line(&command(5, "\"left\""), &mut store, &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::InvalidCommand));
        out.clear();

        session.handle_line(&command(6, "\"left\",\"up\""), &mut store, &mut out);
        assert!(matches!(&out[0], ClientOutbound::Ack(a) if a.seq == 6));
        assert!(matches!(&out[1], ClientOutbound::Observation(_)));
    }

    #[test]
    fn test_bad_json_and_unknown_type() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "alice"), &mut store, &mut out);
        out.clear();

        session.handle_line(r#"{"seq":2,"type":"command","actions":"#, &mut store, &mut out);
        match &out[0] {
            ClientOutbound::Error(e) => {
                assert_eq!(e.code, ErrorCode::InvalidCommand);
                assert_eq!(e.seq, 2);
            }
            other => panic!("expected error, got {:?}", other),
        }
        out.clear();

        session.handle_line(r#"{"type":"control","seq":3,"ts":0}"#, &mut store, &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::InvalidCommand));
    }

    #[test]
    fn test_score_saved_once_at_game_over() {
        let mut store = ScoreStore::in_memory().unwrap();
        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "alice"), &mut store, &mut out);

        let mut seq = 2;
        while !session.game().unwrap().game_over() {
            out.clear();
            let actions = "\"left\",\"up\",\"right\",\"down\"";
            session.handle_line(&command(seq, actions), &mut store, &mut out);
            seq += 1;
            assert!(seq < 100_000, "game never ended");
        }
        assert_eq!(store.score_count().unwrap(), 1);
        let final_score = session.game().unwrap().score();
        let pid = session.player().unwrap().id;
        assert_eq!(store.best_score(pid).unwrap(), final_score);

        // Moves after game over change nothing and save nothing.
        out.clear();
        session.handle_line(&command(seq, "\"left\""), &mut store, &mut out);
        assert!(matches!(&out[0], ClientOutbound::Ack(a) if a.applied == 0));
        assert_eq!(store.score_count().unwrap(), 1);

        // Restart opens a new episode with the best score carried.
        out.clear();
        session.handle_line(&command(seq + 1, "\"restart\""), &mut store, &mut out);
        let game = session.game().unwrap();
        assert!(!game.game_over());
        assert_eq!(game.episode_id(), 1);
        assert_eq!(game.best_score(), final_score);
        assert_eq!(store.score_count().unwrap(), 1);
    }

    #[test]
    fn test_leaderboard_query() {
        let mut store = ScoreStore::in_memory().unwrap();
        let bob = store.create_player(&fingerprint("bob"), "bob").unwrap();
        store.save_score(bob.id, 5000, 512).unwrap();

        let mut session = Session::new(1, seeded_config());
        let mut out = Vec::new();
        session.handle_line(&hello(1, "alice"), &mut store, &mut out);
        out.clear();

        session.handle_line(
            r#"{"type":"query","seq":2,"ts":0,"what":"leaderboard","limit":5}"#,
            &mut store,
            &mut out,
        );
        match &out[0] {
            ClientOutbound::Leaderboard(lb) => {
                assert_eq!(lb.entries.len(), 1);
                assert_eq!(lb.entries[0].username, "bob");
                assert_eq!(lb.player_rank, 2);
            }
            other => panic!("expected leaderboard, got {:?}", other),
        }
    }

    #[test]
    fn test_outbound_encoding_is_single_line_json() {
        let mut buf = Vec::new();
        let msg = ClientOutbound::Ack(create_ack(1, 0));
        msg.encode_into(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains('\n'));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["type"], "ack");
    }
}
