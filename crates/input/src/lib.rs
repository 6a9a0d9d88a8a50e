//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`], and into
//! [`map::TextEdit`]s while the username field has focus. 2048 is turn-based,
//! so there is no repeat handling: one press is one action.

pub mod map;

pub use tui_2048_types as types;

pub use map::{
    handle_key_event, handle_text_key, is_dismiss_key, should_quit, should_quit_text, TextEdit,
};
