use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};

use tui_2048::adapter::protocol::create_hello;
use tui_2048::adapter::server::{run_server, ServerConfig};
use tui_2048::store::ScoreStore;

async fn start_server(
    store: Arc<Mutex<ScoreStore>>,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        seed: Some(12345),
        ..ServerConfig::default()
    };

    let (ready_tx, ready_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let _ = run_server(config, store, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");
    (addr, handle)
}

async fn send(w: &mut OwnedWriteHalf, line: &str) {
    w.write_all(line.as_bytes()).await.unwrap();
    w.write_all(b"\n").await.unwrap();
    w.flush().await.unwrap();
}

async fn recv(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timed out waiting for line")
        .unwrap()
        .expect("connection closed");
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let store = Arc::new(Mutex::new(ScoreStore::in_memory().unwrap()));
    let (addr, server) = start_server(Arc::clone(&store)).await;

    let stream = TcpStream::connect(addr).await.expect("connect failed");
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let hello = create_hello(1, "e2e-test", "secret", "1.0.0");
    send(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;

    let welcome = recv(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["player"]["username"], "e2e-test");
    assert_eq!(welcome["best_score"], 0);

    let first = recv(&mut lines).await;
    assert_eq!(first["type"], "observation");
    assert_eq!(first["seed"], 12345);
    assert_eq!(first["turn"], 0);
    let tiles = first["board"]["cells"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap().iter())
        .filter(|v| v.as_u64() != Some(0))
        .count();
    assert_eq!(tiles, 2);

    send(
        &mut write_half,
        r#"{"type":"command","seq":2,"ts":1,"actions":["left","up","right","down"]}"#,
    )
    .await;

    let ack = recv(&mut lines).await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");
    let applied = ack["applied"].as_u64().unwrap();
    assert!(applied >= 1);

    let obs = recv(&mut lines).await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["turn"], applied);
    assert_ne!(obs["state_hash"], first["state_hash"]);

    assert_eq!(store.lock().await.player_count().unwrap(), 1);
    server.abort();
}

#[tokio::test]
async fn adapter_requires_hello_and_increasing_seq() {
    let store = Arc::new(Mutex::new(ScoreStore::in_memory().unwrap()));
    let (addr, server) = start_server(store).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    send(&mut write_half, r#"{"type":"command","seq":1,"ts":0,"actions":["left"]}"#).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    let hello = create_hello(5, "seq-test", "seq-secret", "1.0.0");
    send(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;
    assert_eq!(recv(&mut lines).await["type"], "welcome");
    assert_eq!(recv(&mut lines).await["type"], "observation");

    send(&mut write_half, r#"{"type":"command","seq":5,"ts":0,"actions":["left"]}"#).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["message"], "seq must be strictly increasing");

    send(&mut write_half, "{not json").await;
    let err = recv(&mut lines).await;
    assert_eq!(err["code"], "invalid_command");

    send(&mut write_half, r#"{"type":"query","seq":6,"ts":0,"what":"leaderboard"}"#).await;
    let lb = recv(&mut lines).await;
    assert_eq!(lb["type"], "leaderboard");
    assert_eq!(lb["entries"].as_array().unwrap().len(), 0);
    assert_eq!(lb["player_rank"], 1);

    server.abort();
}

#[tokio::test]
async fn adapter_protocol_mismatch_closes_connection() {
    let store = Arc::new(Mutex::new(ScoreStore::in_memory().unwrap()));
    let (addr, server) = start_server(store).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let hello = create_hello(1, "old-client", "x", "2.0.0");
    send(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;
    let err = recv(&mut lines).await;
    assert_eq!(err["code"], "protocol_mismatch");

    let next = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("server did not close the connection")
        .unwrap();
    assert!(next.is_none());

    server.abort();
}

#[tokio::test]
async fn adapter_connections_have_separate_games_and_shared_store() {
    let store = Arc::new(Mutex::new(ScoreStore::in_memory().unwrap()));
    let (addr, server) = start_server(Arc::clone(&store)).await;

    let mut clients = Vec::new();
    for (i, name) in ["first", "second"].iter().enumerate() {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let hello = create_hello(1, name, &format!("cred-{}", i), "1.0.0");
        send(&mut write_half, &serde_json::to_string(&hello).unwrap()).await;
        assert_eq!(recv(&mut lines).await["type"], "welcome");
        assert_eq!(recv(&mut lines).await["type"], "observation");
        clients.push((lines, write_half));
    }

    // Only the first client moves; the second one's game is untouched.
    {
        let (lines, write_half) = &mut clients[0];
        send(write_half, r#"{"type":"command","seq":2,"ts":0,"actions":["left","right"]}"#).await;
        assert_eq!(recv(lines).await["type"], "ack");
        assert!(recv(lines).await["turn"].as_u64().unwrap() >= 1);
    }
    {
        let (lines, write_half) = &mut clients[1];
        send(write_half, r#"{"type":"command","seq":2,"ts":0,"actions":[]}"#).await;
        assert_eq!(recv(lines).await["applied"], 0);
        assert_eq!(recv(lines).await["turn"], 0);
    }

    assert_eq!(store.lock().await.player_count().unwrap(), 2);
    server.abort();
}
