//! Headless 2048 server: plays games for remote clients over TCP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tui_2048::adapter::{run_server, ServerConfig};
use tui_2048::store::{ScoreStore, StoreConfig};

#[derive(Parser, Debug)]
#[command(name = "tui-2048-server", about = "Serve 2048 games over line-delimited JSON")]
struct Args {
    /// Interface to bind (overrides TWENTY48_HOST).
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides TWENTY48_PORT).
    #[arg(long)]
    port: Option<u16>,
    /// Fixed seed for every session (overrides TWENTY48_SEED).
    #[arg(long)]
    seed: Option<u32>,
    /// Directory holding the score store (overrides TWENTY48_DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// JSONL wire log (overrides TWENTY48_WIRE_LOG).
    #[arg(long, value_name = "FILE")]
    wire_log: Option<String>,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ServerConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.wire_log.is_some() {
        config.log_path = args.wire_log;
    }

    let store_config = args
        .data_dir
        .map(StoreConfig::new)
        .unwrap_or_else(StoreConfig::from_env);
    store_config.ensure_dirs()?;
    let store = ScoreStore::open(store_config.store_path())?;
    tracing::info!(
        path = %store_config.store_path().display(),
        players = store.player_count()?,
        scores = store.score_count()?,
        "score store loaded"
    );

    run_server(config, Arc::new(Mutex::new(store)), None).await
}
