//! TUI 2048 (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so binaries, tests and
//! benches can write `tui_2048::core::GameState` and friends. The local
//! terminal session lives in [`app`].

pub mod app;

pub use tui_2048_adapter as adapter;
pub use tui_2048_core as core;
pub use tui_2048_input as input;
pub use tui_2048_store as store;
pub use tui_2048_term as term;
pub use tui_2048_types as types;

pub use app::{App, KeyOutcome};
