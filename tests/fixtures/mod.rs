//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A keymap with one chord, one single key and a modifier binding.
pub const VALID_KEYMAP: &str = r#"
[meta]
version = "1.0"
name = "fixture"

[[bindings]]
keys = ["g c"]
action = "goto_checklist"
description = "Go to checklist"
category = "navigation"

[[bindings]]
keys = ["?"]
action = "toggle_help"
description = "Toggle help"
category = "actions"

[[bindings]]
keys = ["ctrl+q"]
action = "quit"
description = "Quit"
category = "actions"
"#;

/// Two bindings normalizing to the same sequence.
pub const DUPLICATE_KEYMAP: &str = r#"
[meta]
version = "1.0"
name = "duplicate"

[[bindings]]
keys = ["G"]
action = "jump_last"
description = "Jump to last"
category = "navigation"

[[bindings]]
keys = ["shift+g"]
action = "goto_items"
description = "Go to items"
category = "navigation"
"#;

/// A chord hidden behind its own first key.
pub const SHADOWED_KEYMAP: &str = r#"
[meta]
version = "1.0"
name = "shadowed"

[[bindings]]
keys = ["g"]
action = "jump_first"
description = "Jump to first"
category = "navigation"

[[bindings]]
keys = ["g c"]
action = "goto_checklist"
description = "Go to checklist"
category = "navigation"
"#;

/// Path to the keychord binary
pub fn keychord_bin() -> String {
    std::env::var("CARGO_BIN_EXE_keychord").unwrap_or_else(|_| "target/debug/keychord".to_string())
}

/// Creates a Command with an isolated config directory.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(keychord_bin());
    cmd.env("KEYCHORD_CONFIG_DIR", config_dir);
    cmd.env_remove("KEYCHORD_LOG");
    cmd.args(args);
    cmd
}

/// Writes `content` to `name` inside `dir` and returns the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}
