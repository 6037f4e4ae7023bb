//! Keychord library
//!
//! Keyboard shortcut dispatching with multi-key chords, the TOML keymap and
//! configuration layers around it, and the terminal host application.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod keymap;
pub mod shortcuts;
#[cfg(feature = "ratatui")]
pub mod tui;
