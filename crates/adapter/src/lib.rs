//! Adapter module - remote play over a TCP socket with a JSON protocol
//!
//! External clients (bots, scripts, other front-ends) play 2048 through a
//! **line-delimited JSON protocol**. Each connection gets its own game; the
//! score store is shared, so remote games land on the same leaderboard as
//! local ones.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:23234)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//!    (and an `observation` when streaming)
//! 3. **Commanding**: Client sends `command` with one or more actions; the
//!    server replies with `ack` and an `observation`
//! 4. **Queries**: `query` with `what: "leaderboard"` returns the top games
//!
//! Sequence numbers must strictly increase per connection. A game's score is
//! stored once, when the game first ends.
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, credential
//! - **command**: `up`, `down`, `left`, `right`, `restart`
//! - **query**: leaderboard
//!
//! ## Server → Client
//!
//! - **welcome**: player record, best score, capabilities
//! - **observation**: board, score, flags, last move, state hash
//! - **ack**: command applied
//! - **leaderboard**: ranked games and the player's rank
//! - **error**: error code and message
//!
//! # Environment Variables
//!
//! - `TWENTY48_HOST`: Bind address (default: "127.0.0.1")
//! - `TWENTY48_PORT`: Port number (default: 23234)
//! - `TWENTY48_SEED`: Fixed seed for every session (default: random)
//! - `TWENTY48_WIRE_LOG`: Append every line sent and received to this file
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"1.0"},"protocol_version":"1.0.0","credential":"s3cret"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","game_id":"tui-2048","player":{"id":1,"username":"bot"},"best_score":0,...}
//! Server -> Client: {"type":"observation","seq":1,"ts":...,"board":{"size":4,"cells":[[0,2,0,0],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"actions":["left","up"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok","applied":2}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 23234
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"tester","version":"1"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod server;

pub use tui_2048_core as core;
pub use tui_2048_store as store;
pub use tui_2048_types as types;

pub use protocol::*;
pub use server::*;
