//! CLI command handlers.
//!
//! Headless, scriptable access to the keymap and configuration, for
//! automation and CI checks of keymap files.

pub mod common;
pub mod config;
pub mod keys;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use keys::KeysArgs;
