//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for the 2048 board. It avoids
//! widget/layout libraries and renders into a plain framebuffer that is then
//! flushed to a terminal backend.
//!
//! - `game_view` is pure: snapshot in, framebuffer out
//! - `animation` produces the intermediate boards of a slide
//! - `renderer` owns the terminal and emits only changed cells

pub mod animation;
pub mod fb;
pub mod game_view;
pub mod palette;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_store as store;
pub use tui_2048_types as types;

pub use animation::SlideAnimation;
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Screen, ScreenView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
