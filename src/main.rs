//! Terminal 2048 runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `term`.
//! Logging goes to a file only (`--log-file`), never to the screen.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tui_2048::app::{App, KeyOutcome};
use tui_2048::store::{ScoreStore, StoreConfig};
use tui_2048::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use tui_2048::types::ANIMATION_FRAME_MS;

#[derive(Parser, Debug)]
#[command(name = "tui-2048", about = "Play 2048 in the terminal")]
struct Args {
    /// Identity your scores are kept under; defaults to $USER. A new
    /// identity is asked for a username on first start.
    #[arg(long, env = "TWENTY48_PLAYER")]
    player: Option<String>,
    /// Directory holding the score store.
    #[arg(long, env = "TWENTY48_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Seed for tile spawning (random when omitted).
    #[arg(long, env = "TWENTY48_SEED")]
    seed: Option<u32>,
    /// Write logs to this file.
    #[arg(long, env = "TWENTY48_LOG_PATH", value_name = "FILE")]
    log_file: Option<PathBuf>,
    /// Tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let credential = args
        .player
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "local".to_string());
    let store_config = args
        .data_dir
        .clone()
        .map(StoreConfig::new)
        .unwrap_or_else(StoreConfig::from_env);
    store_config.ensure_dirs()?;
    let store = ScoreStore::open(store_config.store_path())?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut app = App::seeded(&credential, store, seed)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = args.log_file.as_ref() else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(ANIMATION_FRAME_MS as u64);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            view.render_into(app.snapshot(), &app.view(), Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => match app.handle_key(key) {
                    KeyOutcome::Quit => return Ok(()),
                    KeyOutcome::Redraw => dirty = true,
                    KeyOutcome::Unchanged => {}
                },
                Event::Resize(_, _) => {
                    term.invalidate();
                    dirty = true;
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            dirty |= app.tick();
        }
    }
}
