//! Keymap files driving a live dispatcher.

use std::time::Instant;

use keychord::keymap::{ActionQueue, Keymap, KeymapError};
use keychord::shortcuts::{Action, Dispatcher, KeyPress, Outcome, RegistryError, Target};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

fn press(dispatcher: &mut Dispatcher, keys: &str, at: Instant) -> Outcome {
    dispatcher
        .handle_event(&KeyPress::new(keys.parse().unwrap(), Target::Document, at))
        .unwrap()
}

#[test]
fn test_keymap_file_drives_dispatcher() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "keymap.toml", VALID_KEYMAP);
    let keymap = Keymap::load_from(&path).unwrap();

    let queue = ActionQueue::new();
    let mut dispatcher = Dispatcher::default();
    dispatcher.register(keymap.queued_definitions(&queue)).unwrap();
    dispatcher.start();
    let t0 = Instant::now();

    assert_eq!(press(&mut dispatcher, "g", t0), Outcome::Pending);
    press(&mut dispatcher, "c", t0);
    press(&mut dispatcher, "?", t0);
    press(&mut dispatcher, "ctrl+q", t0);

    assert_eq!(
        queue.drain(),
        vec![Action::GotoChecklist, Action::ToggleHelp, Action::Quit]
    );
}

#[test]
fn test_duplicate_keymap_rejected_by_dispatcher() {
    let keymap = Keymap::parse(DUPLICATE_KEYMAP).unwrap();
    let queue = ActionQueue::new();
    let mut dispatcher = Dispatcher::default();

    let err = dispatcher
        .register(keymap.queued_definitions(&queue))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateSequence { .. }));
    assert!(dispatcher.definitions().is_empty());
}

#[test]
fn test_shadowed_chord_reported_and_shorter_wins() {
    let keymap = Keymap::parse(SHADOWED_KEYMAP).unwrap();
    let shadowed = keymap.validate().unwrap();
    assert_eq!(shadowed, vec![("g then c".to_string(), "g".to_string())]);

    let queue = ActionQueue::new();
    let mut dispatcher = Dispatcher::default();
    dispatcher.register(keymap.queued_definitions(&queue)).unwrap();
    dispatcher.start();
    let t0 = Instant::now();

    assert_eq!(press(&mut dispatcher, "g", t0), Outcome::Fired { index: 0 });
    assert_eq!(press(&mut dispatcher, "c", t0), Outcome::Ignored);
    assert_eq!(queue.drain(), vec![Action::JumpToFirst]);
}

#[test]
fn test_missing_keymap_file() {
    let dir = TempDir::new().unwrap();
    let result = Keymap::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(KeymapError::Io { .. })));
}

#[test]
fn test_unknown_category_is_parse_error() {
    let content = VALID_KEYMAP.replace("\"actions\"", "\"gestures\"");
    assert!(matches!(
        Keymap::parse(&content),
        Err(KeymapError::Parse(_))
    ));
}
