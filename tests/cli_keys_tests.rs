//! End-to-end tests for `keychord keys` commands.

use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_keys_lists_default_keymap() {
    let dir = TempDir::new().unwrap();
    let output = isolated_command(&["keys"], dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("NAVIGATION"));
    assert!(stdout.contains("ACTIONS"));
    assert!(stdout.contains("g then c"));
}

#[test]
fn test_keys_json_filtered_by_category() {
    let dir = TempDir::new().unwrap();
    let output = isolated_command(&["keys", "--json", "--category", "views"], dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    let categories = result["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "views");

    let first = &categories[0]["shortcuts"][0];
    assert!(first["keys"].as_str().unwrap().contains(" then "));
    assert!(first["sequence"].is_array());
    assert!(first["action"].is_string());
}

#[test]
fn test_keys_uses_configured_keymap() {
    let dir = TempDir::new().unwrap();
    let keymap = write_file(&dir, "keymap.toml", VALID_KEYMAP);
    let output = isolated_command(
        &["config", "set", "--keymap", keymap.to_str().unwrap()],
        dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let output = isolated_command(&["keys", "--json"], dir.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["name"], "fixture");
}

#[test]
fn test_keys_unknown_category_rejected() {
    let dir = TempDir::new().unwrap();
    let output = isolated_command(&["keys", "--category", "gestures"], dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_keys_check_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "keymap.toml", VALID_KEYMAP);
    let output = isolated_command(&["keys", "check", path.to_str().unwrap()], dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 bindings OK"));
}

#[test]
fn test_keys_check_duplicate_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "keymap.toml", DUPLICATE_KEYMAP);
    let output = isolated_command(&["keys", "check", path.to_str().unwrap()], dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate shortcut sequence 'G'"), "stderr: {stderr}");
}

#[test]
fn test_keys_check_reports_shadowed_chords() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "keymap.toml", SHADOWED_KEYMAP);
    let output = isolated_command(&["keys", "check", path.to_str().unwrap()], dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("'g then c' can never fire"));
}

#[test]
fn test_keys_check_bad_key_name() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "keymap.toml",
        &VALID_KEYMAP.replace("ctrl+q", "hyper+q"),
    );
    let output = isolated_command(&["keys", "check", path.to_str().unwrap()], dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
}
